//! # Dispatcher
//!
//! 群发调度模块。
//!
//! 负责：
//! - 按固定间隔逐个处理收件人 (渲染 → 可达性检查 → 发送)
//! - 记录投递结果并推送进度事件
//! - 历史归档旁路调用 (fire-and-forget)
//! - 单活动约束、停止信号、历史管理、关键词自动回复

pub mod archive;
pub mod attachment;
pub mod autoreply;
pub mod controller;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod recorder;
pub mod store;

pub use archive::{ConfiguredArchive, HttpHistoryArchive, MemoryArchive};
pub use attachment::AttachmentLoader;
pub use autoreply::AutoResponder;
pub use contracts::{DeliveryOutcome, ObserverEvent, ProgressObserver};
pub use controller::{CampaignController, CampaignPhase, STARTED_MESSAGE};
pub use engine::{
    BroadcastEngine, BroadcastEngineBuilder, CampaignReport, CampaignState, EngineConfig,
    FINISHED_MESSAGE,
};
pub use error::DispatcherError;
pub use metrics::{CampaignMetrics, MetricsSnapshot};
pub use observer::{BroadcastObserver, FanoutObserver, LogObserver, RecordingObserver};
pub use recorder::OutcomeRecorder;
pub use store::{MemoryStore, SqliteStore};
