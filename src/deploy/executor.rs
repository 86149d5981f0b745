use indicatif::ProgressBar;

use super::task::{DeployTask, TaskOutcome, execute_task};
use crate::session::RemoteFs;

/// 每个并发窗口的任务数上限。限制同时在途的远端操作数量，
/// 同时保留足以摊平单次往返延迟的并发度。
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Run `tasks` in consecutive chunks of at most `chunk_size`. Chunks execute
/// strictly in submission order and never overlap; within a chunk every task
/// runs on its own scoped thread and the chunk fully settles before the next
/// one starts. A task's own failure is already folded into its outcome by
/// [`execute_task`] and never aborts sibling tasks.
///
/// The only aborting condition is loss of the transport session itself: when
/// an entire chunk comes back failed, the session is probed once and, if it
/// is gone, every not-yet-started task is failed immediately without being
/// executed.
pub fn run_batched(
    tasks: &[DeployTask],
    chunk_size: usize,
    fs: &dyn RemoteFs,
    progress: Option<&ProgressBar>,
) -> Vec<TaskOutcome> {
    let chunk_size = chunk_size.max(1);
    let mut outcomes: Vec<TaskOutcome> = Vec::with_capacity(tasks.len());
    let mut session_lost = false;

    for chunk in tasks.chunks(chunk_size) {
        if session_lost {
            outcomes.extend(
                chunk.iter().map(|t| TaskOutcome { success: false, path: t.remote.clone() }),
            );
            if let Some(pb) = progress {
                pb.inc(chunk.len() as u64);
            }
            continue;
        }

        let (tx, rx) = crossbeam_channel::bounded::<TaskOutcome>(chunk.len());
        std::thread::scope(|scope| {
            for task in chunk {
                let tx = tx.clone();
                scope.spawn(move || {
                    let outcome = execute_task(fs, task);
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    let _ = tx.send(outcome);
                });
            }
        });
        drop(tx);
        let chunk_outcomes: Vec<TaskOutcome> = rx.into_iter().collect();

        let all_failed = !chunk_outcomes.is_empty() && chunk_outcomes.iter().all(|o| !o.success);
        outcomes.extend(chunk_outcomes);
        if all_failed && !fs.alive() {
            tracing::warn!("传输会话已丢失，剩余任务直接标记为失败");
            session_lost = true;
        }
    }

    outcomes
}
