use crate::entitys::snapshot::CacheValue;
use common::redis::CacheGateway;
use dashmap::DashMap;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// 每个键的失效代数，失效时加一
type Epochs = Arc<DashMap<String, u64>>;

enum CacheCommand {
    /// `epoch` 为回源前读到的失效代数
    Set { key: String, value: Vec<u8>, epoch: u64 },
    Delete { key: String },
    Flush(oneshot::Sender<()>),
}

/// 旁路缓存：读缓存失败一律回源，回写与失效交给后台写缓存协程按提交顺序执行，
/// 调用方从不等待缓存写入。回源期间键被失效过的回写会被丢弃。
#[derive(Clone)]
pub struct CacheAsideStore {
    cache: Arc<dyn CacheGateway>,
    sender: mpsc::UnboundedSender<CacheCommand>,
    epochs: Epochs,
}

impl CacheAsideStore {
    /// 需在 tokio 运行时内创建（启动写缓存协程）
    pub fn new(cache: Arc<dyn CacheGateway>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let epochs: Epochs = Arc::new(DashMap::new());
        tokio::spawn(run_cache_writer(cache.clone(), epochs.clone(), receiver));
        Self { cache, sender, epochs }
    }

    /// 先读缓存，未命中 / 出错 / 解码失败时调用 `load` 回源，并异步回写
    pub async fn fetch_or_load<T, E, F, Fut>(&self, key: String, load: F) -> Result<T, E>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match T::decode(&bytes) {
                Some(value) => return Ok(value),
                None => debug!("cache entry undecodable, key={}", key),
            },
            Ok(None) => {}
            Err(e) => debug!("cache get failed, key={}: {}", key, e),
        }

        let epoch = current_epoch(&self.epochs, &key);
        let value = load().await?;
        if value.is_cacheable() {
            self.submit(CacheCommand::Set { key, value: value.encode(), epoch });
        }
        Ok(value)
    }

    /// 异步删除缓存键；代数立即递增，此前开始回源的回写随之作废
    pub fn invalidate(&self, key: String) {
        *self.epochs.entry(key.clone()).or_insert(0) += 1;
        self.submit(CacheCommand::Delete { key });
    }

    /// 等待此前提交的缓存命令全部执行完
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(CacheCommand::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn submit(&self, command: CacheCommand) {
        if self.sender.send(command).is_err() {
            debug!("cache writer stopped, command dropped");
        }
    }
}

fn current_epoch(epochs: &DashMap<String, u64>, key: &str) -> u64 {
    epochs.get(key).map(|epoch| *epoch).unwrap_or(0)
}

async fn run_cache_writer(
    cache: Arc<dyn CacheGateway>,
    epochs: Epochs,
    mut receiver: mpsc::UnboundedReceiver<CacheCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            CacheCommand::Set { key, value, epoch } => {
                if current_epoch(&epochs, &key) != epoch {
                    debug!("stale write-back dropped, key={}", key);
                    continue;
                }
                if let Err(e) = cache.set(&key, value).await {
                    debug!("cache set failed, key={}: {}", key, e);
                }
            }
            CacheCommand::Delete { key } => {
                if let Err(e) = cache.delete(&key).await {
                    debug!("cache delete failed, key={}: {}", key, e);
                }
            }
            CacheCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
