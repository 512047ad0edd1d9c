mod common;

use common::*;
use minebench::{
    keys, DatasetName, MetricValue, Miner, MinerSettings, ResultStore, Sentinel, SoundnessStatus,
    StageRunner,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn dataset() -> DatasetName {
    DatasetName::new("tiny")
}

#[test]
fn fast_mining_stores_the_elapsed_time() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();
    let miner: Arc<dyn Miner> = Arc::new(SleepyMiner {
        delay: Duration::from_millis(50),
    });

    let model = runner
        .mine(&miner, &MinerSettings::new(), &tiny_log(), &dataset(), "SLEEPY", &mut store)
        .unwrap();
    assert!(model.is_some());

    match store.get(&dataset(), "SLEEPY", keys::MINING_TIME) {
        MetricValue::DurationMs(ms) => {
            assert!((30..2000).contains(&ms), "mining-time was {ms} ms")
        }
        other => panic!("expected a duration, got {other:?}"),
    }
}

#[test]
fn slow_mining_stores_the_timeout_sentinel() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let mut config = test_config();
    config.miner_timeout = Duration::from_millis(200);
    let runner = StageRunner::new(config, collaborators);
    let mut store = ResultStore::new();
    let miner: Arc<dyn Miner> = Arc::new(SleepyMiner {
        delay: Duration::from_millis(500),
    });

    let model = runner
        .mine(&miner, &MinerSettings::new(), &tiny_log(), &dataset(), "SLEEPY", &mut store)
        .unwrap();
    assert!(model.is_none());
    assert_eq!(
        store.get(&dataset(), "SLEEPY", keys::MINING_TIME),
        MetricValue::Sentinel(Sentinel::Timeout)
    );
}

#[test]
fn unsound_model_skips_the_performance_collaborators() {
    let (collaborators, _, fitness_calls, _) = fixed_collaborators(false, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();

    runner
        .performance(
            &sequence_model(),
            &tiny_log(),
            SoundnessStatus::Unsound,
            &dataset(),
            "SLEEPY",
            &mut store,
        )
        .unwrap();

    assert_eq!(fitness_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        store.get(&dataset(), "SLEEPY", keys::FITNESS),
        MetricValue::Sentinel(Sentinel::NotSound)
    );
    assert_eq!(
        store.get(&dataset(), "SLEEPY", keys::PRECISION),
        MetricValue::Sentinel(Sentinel::NotSound)
    );
}

#[test]
fn sound_by_construction_skips_the_soundness_checker() {
    struct BlessedMiner;
    impl Miner for BlessedMiner {
        fn name(&self) -> &str {
            "BlessedMiner"
        }
        fn acronym(&self) -> &str {
            "IM-STUB"
        }
        fn mine(
            &self,
            _log: &minebench::EventLog,
            _settings: &MinerSettings,
        ) -> minebench::Result<minebench::ProcessModel> {
            Ok(sequence_model())
        }
        fn sound_by_construction(&self) -> bool {
            true
        }
    }

    let (collaborators, soundness_calls, _, _) = fixed_collaborators(false, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();
    let miner: Arc<dyn Miner> = Arc::new(BlessedMiner);

    let status = runner
        .soundness(&miner, &sequence_model(), &dataset(), "IM-STUB", &mut store)
        .unwrap();

    assert_eq!(status, SoundnessStatus::Sound);
    assert_eq!(soundness_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        store.get(&dataset(), "IM-STUB", keys::SOUNDNESS),
        MetricValue::label("sound")
    );
}

#[test]
fn f_score_is_the_harmonic_mean() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();

    runner
        .performance(
            &sequence_model(),
            &tiny_log(),
            SoundnessStatus::Sound,
            &dataset(),
            "SLEEPY",
            &mut store,
        )
        .unwrap();

    match store.get(&dataset(), "SLEEPY", keys::F_SCORE) {
        MetricValue::Number(f) => assert!((f - 0.685714).abs() < 1e-4, "f-score was {f}"),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn degenerate_f_score_stores_the_error_value_sentinel() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.0005, 0.0003);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();

    runner
        .performance(
            &sequence_model(),
            &tiny_log(),
            SoundnessStatus::Sound,
            &dataset(),
            "SLEEPY",
            &mut store,
        )
        .unwrap();

    assert_eq!(
        store.get(&dataset(), "SLEEPY", keys::F_SCORE),
        MetricValue::Sentinel(Sentinel::ErrorValue)
    );
}

#[test]
fn complexity_metrics_are_all_recorded() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();
    let miner: Arc<dyn Miner> = Arc::new(SleepyMiner {
        delay: Duration::ZERO,
    });

    runner
        .complexity(
            &miner,
            &MinerSettings::new(),
            &sequence_model(),
            &tiny_log(),
            &dataset(),
            "SLEEPY",
            &mut store,
            true,
        )
        .unwrap();

    for metric in keys::COMPLEXITY {
        assert!(
            !store.get(&dataset(), "SLEEPY", metric).is_unknown(),
            "metric {metric} was never recorded"
        );
        let time_key = format!("{metric}-time");
        assert!(
            !store.get(&dataset(), "SLEEPY", &time_key).is_unknown(),
            "metric {metric} has no elapsed time"
        );
    }
    assert!(!store
        .get(&dataset(), "SLEEPY", keys::STRUCTUREDNESS)
        .is_unknown());
}

#[test]
fn shutdown_aborts_the_remaining_stage_sequence() {
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let mut runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();
    let miner: Arc<dyn Miner> = Arc::new(SleepyMiner {
        delay: Duration::ZERO,
    });

    runner.shutdown();
    let result = runner.mine(
        &miner,
        &MinerSettings::new(),
        &tiny_log(),
        &dataset(),
        "SLEEPY",
        &mut store,
    );
    assert!(matches!(result, Err(err) if err.is_abort()));
}

#[test]
fn metric_failure_does_not_block_sibling_metrics() {
    // a diagram without connectors makes the density metrics fail while
    // the counting metrics still succeed
    let (collaborators, _, _, _) = fixed_collaborators(true, 0.8, 0.6);
    let runner = StageRunner::new(test_config(), collaborators);
    let mut store = ResultStore::new();

    struct LinearMiner;
    impl Miner for LinearMiner {
        fn name(&self) -> &str {
            "LinearMiner"
        }
        fn acronym(&self) -> &str {
            "LINEAR"
        }
        fn mine(
            &self,
            _log: &minebench::EventLog,
            _settings: &MinerSettings,
        ) -> minebench::Result<minebench::ProcessModel> {
            Ok(sequence_model())
        }
    }

    let miner: Arc<dyn Miner> = Arc::new(LinearMiner);
    runner
        .complexity(
            &miner,
            &MinerSettings::new(),
            &sequence_model(),
            &tiny_log(),
            &dataset(),
            "LINEAR",
            &mut store,
            false,
        )
        .unwrap();

    // density metrics failed independently
    assert_eq!(
        store.get(&dataset(), "LINEAR", keys::SIZE_DENSITY_MIN),
        MetricValue::Sentinel(Sentinel::Error)
    );
    // counting metrics still made it
    assert_eq!(
        store.get(&dataset(), "LINEAR", keys::SIZE_NODE),
        MetricValue::Number(4.0)
    );
}
