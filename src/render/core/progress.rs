//! 渲染进度报告
//!
//! 进度通过无界通道发送给调用者。接收端被丢弃时发送失败会被忽略，
//! 渲染照常进行。

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// 进度事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// 开始渲染，`total` 为占位符总数
    Started { total: usize },
    /// 节流后的中间进度
    Progress { processed: usize, errors: usize },
    /// 渲染完成
    Finished { processed: usize, errors: usize },
}

/// 进度跟踪器
///
/// 维持 `errors <= processed <= total`。
#[derive(Debug)]
pub struct ProgressTracker {
    sender: Option<UnboundedSender<ProgressEvent>>,
    total: usize,
    processed: usize,
    errors: usize,
    interval: Duration,
    last_update: Instant,
}

impl ProgressTracker {
    /// 创建跟踪器，`sender` 为 `None` 时不发送任何事件
    pub fn new(sender: Option<UnboundedSender<ProgressEvent>>, interval: Duration) -> Self {
        Self {
            sender,
            total: 0,
            processed: 0,
            errors: 0,
            interval,
            last_update: Instant::now(),
        }
    }

    /// 开始新一轮渲染
    ///
    /// `Started` 也算一次通知，节流从这里开始计时。
    pub fn start(&mut self, total: usize) {
        self.total = total;
        self.processed = 0;
        self.errors = 0;
        self.last_update = Instant::now();
        self.send(ProgressEvent::Started { total });
    }

    /// 记录处理完一个占位符，返回是否发送了进度事件
    pub fn step(&mut self, failed: bool) -> bool {
        self.processed += 1;
        if failed {
            self.errors += 1;
        }

        if self.sender.is_none() || self.last_update.elapsed() < self.interval {
            return false;
        }

        self.last_update = Instant::now();
        self.send(ProgressEvent::Progress {
            processed: self.processed,
            errors: self.errors,
        });
        true
    }

    /// 结束渲染
    pub fn finish(&mut self) {
        self.send(ProgressEvent::Finished {
            processed: self.processed,
            errors: self.errors,
        });
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                tracing::trace!("进度接收端已关闭，忽略事件 {:?}", event);
            }
        }
    }
}
