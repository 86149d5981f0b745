use owo_colors::OwoColorize;

use crate::util::human_bytes;

/// 单类条目（文件夹或文件）的数量与字节数。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub count: u64,
    pub bytes: u64,
}

impl Counter {
    pub fn record(&mut self, bytes: u64) {
        self.count += 1;
        self.bytes += bytes;
    }
}

/// Per-phase statistics accumulated while walking a tree. Rendered once per
/// phase, never persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStats {
    pub directory: Counter,
    pub file: Counter,
}

impl PhaseStats {
    pub fn record_dir(&mut self, bytes: u64) {
        self.directory.record(bytes);
    }

    pub fn record_file(&mut self, bytes: u64) {
        self.file.record(bytes);
    }

    pub fn total_bytes(&self) -> u64 {
        self.directory.bytes + self.file.bytes
    }

    pub fn render(&self, label: &str) -> String {
        format!(
            "{} 文件夹:{} 个, 文件:{} 个, 总大小:{}",
            label,
            self.directory.count,
            self.file.count,
            human_bytes(self.total_bytes())
        )
    }

    /// 打印阶段统计（绿色一行，格式与 render 一致）。
    pub fn print(&self, label: &str) {
        println!("{}", self.render(label).green());
    }
}
