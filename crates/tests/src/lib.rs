//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（Mock 传输层，无需真实网关）

#[cfg(test)]
mod contract_tests {
    use contracts::{RecipientRecord, SENTINEL_ADDRESS};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let config = contracts::BroadcasterConfig::default();
        assert!(config_loader::ConfigLoader::validate(&config).is_ok());
        assert_eq!(SENTINEL_ADDRESS, "0000000000");
    }

    #[test]
    fn test_parse_reference_input() {
        let records = ingestion::parse_recipients("Alice,5551234567\nBob\n,9998887776\n");
        assert_eq!(
            records,
            vec![
                RecipientRecord::new("Alice", "5551234567"),
                RecipientRecord::new("Bob", SENTINEL_ADDRESS),
                RecipientRecord::new("undefined", SENTINEL_ADDRESS),
            ]
        );
    }

    #[test]
    fn test_parse_one_record_per_line() {
        let raw = "a,1\n\n,\nname,123456789,x,y\nz,12345678901\n   \n";
        let records = ingestion::parse_recipients(raw);
        assert_eq!(records.len(), raw.lines().count());
        for record in &records {
            assert!(!record.address.is_empty());
            assert!(record.address.len() >= 10 || record.address == SENTINEL_ADDRESS);
        }
        // 第二字段短于 10 个字符
        assert_eq!(records[0].address, SENTINEL_ADDRESS);
        assert_eq!(records[3].address, SENTINEL_ADDRESS);
        assert_eq!(records[4].address, "12345678901");
    }

    #[test]
    fn test_render_reference_example() {
        let record = RecipientRecord::new("Jane Doe", "+1555").with_extras(vec!["X1".into()]);
        let template = "Hi &fullname (&firstname), your code is &var1";
        let first = template::render(template, &record);
        assert_eq!(first, "Hi Jane Doe (Jane), your code is X1");
        assert_eq!(template::render(template, &record), first);
        assert_eq!(template::render("&var2 stays", &record), "&var2 stays");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        BroadcastRequest, ObserverEvent, OutcomeStore, ProgressObserver, SessionState,
    };
    use dispatcher::{
        BroadcastEngine, CampaignController, CampaignPhase, CampaignState, DispatcherError,
        EngineConfig, FanoutObserver, MemoryArchive, RecordingObserver, SqliteStore,
        FINISHED_MESSAGE, STARTED_MESSAGE,
    };
    use tokio_util::sync::CancellationToken;
    use transport::{MockTransport, MockTransportConfig};

    const FAST: EngineConfig = EngineConfig {
        send_interval: Duration::from_millis(1),
        settle_delay: Duration::from_millis(50),
    };

    struct Fixture {
        controller: CampaignController<MockTransport, SqliteStore, MemoryArchive>,
        transport: Arc<MockTransport>,
        archive: Arc<MemoryArchive>,
        observer: Arc<RecordingObserver>,
        _dir: tempfile::TempDir,
    }

    fn fixture(config: MockTransportConfig) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("broadcast.db")).unwrap();
        let transport = Arc::new(MockTransport::with_config(config));
        let archive = Arc::new(MemoryArchive::new());
        let observer = Arc::new(RecordingObserver::new());

        let engine = BroadcastEngine::builder(
            Arc::clone(&transport),
            Arc::new(store),
            Arc::clone(&archive),
        )
        .observer(observer.clone())
        .config(FAST)
        .build()
        .unwrap();

        Fixture {
            controller: CampaignController::new(engine),
            transport,
            archive,
            observer,
            _dir: dir,
        }
    }

    fn percents(observer: &RecordingObserver) -> Vec<(usize, usize)> {
        observer
            .named("percent")
            .into_iter()
            .filter_map(|event| match event {
                ObserverEvent::Percent { counter, total } => Some((counter, total)),
                _ => None,
            })
            .collect()
    }

    /// End-to-end test: raw list -> controller -> engine -> store / observer
    ///
    /// 验证完整的数据流：
    /// 1. 解析收件人列表
    /// 2. 按顺序逐个发送并记录结果
    /// 3. 进度事件与完成事件
    #[tokio::test]
    async fn test_e2e_mock_campaign() {
        let fx = fixture(MockTransportConfig::default());
        let raw = "Alice,5551234567,A1\nBob\nCarol,081111111111,C3\n";
        let request = BroadcastRequest::new("Hi &firstname (&var1)")
            .with_title("Promo")
            .with_tags("ops", "2024");

        let total = fx.controller.submit(raw, request).await.unwrap();
        assert_eq!(total, 3);

        let report = fx.controller.wait().await.unwrap().unwrap();
        assert_eq!(report.processed, 3);
        assert!(!report.cancelled);
        assert_eq!(fx.controller.phase(), CampaignPhase::Idle);

        // N outcomes, in input order
        let history = fx.controller.history().await.unwrap();
        let names: Vec<_> = history
            .iter()
            .map(|row| row.outcome.recipient_name.as_str())
            .collect();
        assert_eq!(names, ["Alice", "Bob", "Carol"]);
        assert_eq!(history[1].outcome.destination_address, "0000000000");

        // N progress events with 1-based counters
        assert_eq!(percents(&fx.observer), vec![(1, 3), (2, 3), (3, 3)]);

        let sent = fx.transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].chat_id, "5551234567@c.us");
        assert_eq!(sent[0].text, "Hi Alice (A1)");
        assert_eq!(sent[2].chat_id, "6281111111111@c.us");

        // Bob 的地址是哨兵值，不归档
        let phones: Vec<_> = fx.archive.entries().into_iter().map(|e| e.phone).collect();
        assert_eq!(phones.len(), 2);
        assert!(phones.iter().all(|p| p != "62000000000"));
        assert!(phones.contains(&"6281111111111".to_string()));

        let events = fx.observer.events();
        assert_eq!(events.first(), Some(&ObserverEvent::info(STARTED_MESSAGE)));
        assert_eq!(events.last(), Some(&ObserverEvent::info(FINISHED_MESSAGE)));
    }

    #[tokio::test]
    async fn test_e2e_undeliverable_is_recorded_without_send() {
        let config = MockTransportConfig {
            unregistered: HashSet::from(["5551234567@c.us".to_string()]),
            failing_checks: HashSet::from(["5552222222@c.us".to_string()]),
            ..Default::default()
        };
        let fx = fixture(config);

        fx.controller
            .submit(
                "Alice,5551234567\nBob,5552222222\nCarol,5553333333\n",
                BroadcastRequest::new("Hello &fullname"),
            )
            .await
            .unwrap();
        let report = fx.controller.wait().await.unwrap().unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.delivered, 1);

        let delivered: Vec<_> = fx
            .controller
            .history()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.outcome.delivered)
            .collect();
        assert_eq!(delivered, [false, false, true]);

        let sent = fx.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "Hello Carol");
        assert_eq!(percents(&fx.observer).len(), 3);
    }

    #[tokio::test]
    async fn test_e2e_disconnected_session_rejects() {
        let fx = fixture(MockTransportConfig {
            state: SessionState::Disconnected,
            ..Default::default()
        });

        let err = fx
            .controller
            .submit("Alice,5551234567\n", BroadcastRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatcherError::TransportNotReady { .. }));
        assert_eq!(fx.controller.phase(), CampaignPhase::Idle);
        assert!(fx.transport.sent().is_empty());

        let infos = fx.observer.named("info");
        assert_eq!(infos.len(), 1);
        assert!(matches!(
            &infos[0],
            ObserverEvent::Info { message, .. } if message.contains("not connected")
        ));

        // 会话恢复后可以正常提交
        fx.transport.set_state(SessionState::Connected);
        fx.controller
            .submit("Alice,5551234567\n", BroadcastRequest::new("hi"))
            .await
            .unwrap();
        fx.controller.wait().await.unwrap();
        assert_eq!(fx.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_e2e_stop_running_campaign() {
        let fx = fixture(MockTransportConfig {
            send_delay: Duration::from_millis(20),
            ..Default::default()
        });
        let raw: String = (0..50)
            .map(|i| format!("User{i},55500000{i:02}\n"))
            .collect();

        fx.controller
            .submit(&raw, BroadcastRequest::new("hi &firstname"))
            .await
            .unwrap();
        assert!(matches!(
            fx.controller
                .submit("Late,5551234567\n", BroadcastRequest::new("hi"))
                .await,
            Err(DispatcherError::CampaignActive)
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(fx.controller.stop());
        assert!(!fx.controller.stop());

        let report = fx.controller.wait().await.unwrap().unwrap();
        assert!(report.cancelled);
        assert!(report.processed < 50);

        let history = fx.controller.engine().store().select_all().await.unwrap();
        assert_eq!(history.len(), report.processed);
        assert_eq!(
            fx.observer.events().last(),
            Some(&ObserverEvent::info(FINISHED_MESSAGE))
        );
    }

    /// Cancels the campaign once recipient `k` has been reported
    struct CancelAfter {
        token: CancellationToken,
        counter: usize,
    }

    impl ProgressObserver for CancelAfter {
        fn publish(&self, event: ObserverEvent) {
            if let ObserverEvent::Percent { counter, .. } = event {
                if counter == self.counter {
                    self.token.cancel();
                }
            }
        }
    }

    #[tokio::test]
    async fn test_e2e_cancel_after_k() {
        let k = 2;
        let token = CancellationToken::new();
        let recording = Arc::new(RecordingObserver::new());
        let observer: Arc<dyn ProgressObserver> = Arc::new(FanoutObserver::new(vec![
            recording.clone() as Arc<dyn ProgressObserver>,
            Arc::new(CancelAfter {
                token: token.clone(),
                counter: k + 1,
            }),
        ]));

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path().join("cancel.db")).unwrap());
        let engine = BroadcastEngine::builder(
            Arc::new(MockTransport::new()),
            Arc::clone(&store),
            Arc::new(MemoryArchive::new()),
        )
        .observer(observer)
        .config(FAST)
        .build()
        .unwrap();

        let records = ingestion::parse_recipients(
            "A,5550000001\nB,5550000002\nC,5550000003\nD,5550000004\nE,5550000005\n",
        );
        let state = CampaignState::with_token(records, BroadcastRequest::new("hi"), token);
        let state = engine.run(state).await;

        assert_eq!(state.cursor(), k + 1);
        assert!(state.report().cancelled);
        assert_eq!(store.select_all().await.unwrap().len(), k + 1);
        assert_eq!(
            recording.events().last(),
            Some(&ObserverEvent::info(FINISHED_MESSAGE))
        );
    }
}
