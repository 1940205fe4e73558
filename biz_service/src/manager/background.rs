use std::future::Future;
use tokio_util::task::TaskTracker;

/// 后台任务：派发后不等待结果，仅在停机或测试时统一等待结束
#[derive(Debug, Clone)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self { tracker: TaskTracker::new() }
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// 等待当前已派发的任务全部结束，之后仍可继续派发
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
