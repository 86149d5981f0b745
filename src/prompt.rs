use dialoguer::{Confirm, Select};

/// Abstraction over the interactive prompts. The core only ever sees the
/// yes/no decision (or the selected index), never the rendering.
pub trait Confirmation {
    fn confirm_connect(&self) -> bool;
    fn confirm_backup(&self) -> bool;
    fn confirm_mkdir(&self) -> bool;
    fn confirm_delete(&self) -> bool;
    /// 返回被选目标的下标；取消选择（Esc）即放弃本次部署。
    fn select_target(&self, names: &[String]) -> Option<usize>;
}

/// Terminal implementation backed by dialoguer. Prompt failures (non-tty,
/// interrupted) are treated as a declined answer.
pub struct TermPrompt;

impl TermPrompt {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new().with_prompt(message).default(false).interact().unwrap_or(false)
    }
}

impl Confirmation for TermPrompt {
    fn confirm_connect(&self) -> bool {
        self.confirm("确认连接服务器?")
    }

    fn confirm_backup(&self) -> bool {
        self.confirm("确认备份服务器目录下所有文件?")
    }

    fn confirm_mkdir(&self) -> bool {
        self.confirm("远程目录不存在，是否创建?")
    }

    fn confirm_delete(&self) -> bool {
        self.confirm("确定删除服务器目录下所有文件?")
    }

    fn select_target(&self, names: &[String]) -> Option<usize> {
        Select::new()
            .with_prompt("请选择部署环境")
            .items(names)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()
    }
}
