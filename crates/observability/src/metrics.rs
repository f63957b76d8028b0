//! 群发活动指标收集模块
//!
//! 每个收件人处理完成后记录一次；Prometheus 导出由 `init_with_config` 决定。

use contracts::DeliveryOutcome;
use metrics::{counter, gauge, histogram};

/// 记录一条投递结果
pub fn record_outcome(outcome: &DeliveryOutcome) {
    counter!(
        "broadcaster_outcomes_total",
        "delivered" => outcome.delivered.to_string()
    )
    .increment(1);
}

/// 记录发送失败 (传输层报错)
pub fn record_send_failure(transport: &str) {
    counter!(
        "broadcaster_send_failures_total",
        "transport" => transport.to_string()
    )
    .increment(1);
}

/// 记录历史归档调用
pub fn record_archive_call(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("broadcaster_archive_calls_total", "status" => status).increment(1);
}

/// 记录活动阶段切换 (started / stopping / completed / rejected)
pub fn record_campaign_phase(phase: &'static str) {
    counter!("broadcaster_campaigns_total", "phase" => phase).increment(1);
}

/// 记录活动进度 (0.0 ~ 1.0)
pub fn record_campaign_progress(counter: usize, total: usize) {
    let ratio = if total == 0 {
        0.0
    } else {
        counter as f64 / total as f64
    };
    gauge!("broadcaster_campaign_progress_ratio").set(ratio);
}

/// 记录单个收件人耗时 (不含限速等待)
pub fn record_recipient_duration_ms(duration_ms: f64) {
    histogram!("broadcaster_recipient_duration_ms").record(duration_ms);
}

/// 活动指标聚合器
///
/// 在内存中聚合，活动结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct CampaignAggregator {
    /// 已处理收件人
    pub processed: u64,
    /// 已投递
    pub delivered: u64,
    /// 单个收件人耗时统计 (毫秒)
    pub duration_stats: RunningStats,
}

impl CampaignAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: &DeliveryOutcome, duration_ms: f64) {
        self.processed += 1;
        if outcome.delivered {
            self.delivered += 1;
        }
        self.duration_stats.push(duration_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            processed: self.processed,
            delivered: self.delivered,
            delivery_rate: if self.processed > 0 {
                self.delivered as f64 / self.processed as f64 * 100.0
            } else {
                0.0
            },
            duration_ms: StatsSummary::from(&self.duration_stats),
        }
    }
}

/// 活动摘要
#[derive(Debug, Clone, Default)]
pub struct CampaignSummary {
    pub processed: u64,
    pub delivered: u64,
    pub delivery_rate: f64,
    pub duration_ms: StatsSummary,
}

impl std::fmt::Display for CampaignSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Campaign Summary ===")?;
        writeln!(f, "Processed: {}", self.processed)?;
        writeln!(
            f,
            "Delivered: {} ({:.2}%)",
            self.delivered, self.delivery_rate
        )?;
        writeln!(f, "Per-recipient time (ms): {}", self.duration_ms)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "min={:.1}, max={:.1}, mean={:.1} (n={})",
            self.min, self.max, self.mean, self.count
        )
    }
}

/// 在线统计 (count / min / max / mean)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for value in [4.0, 2.0, 6.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 3);
        assert!((stats.mean() - 4.0).abs() < 1e-10);
        assert!((stats.min() - 2.0).abs() < 1e-10);
        assert!((stats.max() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = CampaignAggregator::new();
        aggregator.update(&DeliveryOutcome::new("Alice", "5551234567", true), 12.0);
        aggregator.update(&DeliveryOutcome::new("Bob", "0000000000", false), 8.0);

        let summary = aggregator.summary();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.delivered, 1);
        assert!((summary.delivery_rate - 50.0).abs() < 1e-10);
        assert_eq!(summary.duration_ms.count, 2);
    }

    #[test]
    fn test_summary_display() {
        let summary = CampaignSummary {
            processed: 4,
            delivered: 3,
            delivery_rate: 75.0,
            duration_ms: StatsSummary::default(),
        };

        let output = summary.to_string();
        assert!(output.contains("Processed: 4"));
        assert!(output.contains("75.00%"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_record_functions_without_recorder() {
        // 未安装 recorder 时为 no-op
        record_outcome(&DeliveryOutcome::new("A", "1", true));
        record_send_failure("mock");
        record_archive_call(false);
        record_campaign_phase("started");
        record_campaign_progress(1, 0);
        record_recipient_duration_ms(1.5);
    }
}
