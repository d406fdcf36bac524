//! Integration tests driving a whole session through its public API:
//! intake → identity → biometric → duplicate scan → mobility → result.
//!
//! Time is paused, so the simulated delays run instantly; outcomes are steered
//! with the nullable clock and randomness.

use std::sync::Arc;
use std::time::Duration;
use vvp_nullables::{NullClock, NullRandom};
use vvp_types::{
    CheckStatus, ConstituencyBinding, DuplicateStatus, DuplicateVerdict, OsRandom, RandomSource,
    Stage, StaticRegionDirectory, VerificationOutcome, WorkflowParams,
};
use vvp_workflow::{
    BiometricKind, IdentityOutcome, IntakeForm, MobilityDecision, ProgressEvent, Session,
    SessionConfig, WorkflowError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn regions() -> Arc<StaticRegionDirectory> {
    Arc::new(StaticRegionDirectory::from_pairs([
        ("central", vec!["central-1", "central-2"]),
        ("coastal", vec!["coastal-1", "coastal-2"]),
    ]))
}

fn session_with(random: impl RandomSource + 'static) -> Session {
    Session::new(WorkflowParams::default(), regions())
        .with_clock(Arc::new(NullClock::default()))
        .with_random(Arc::new(random))
}

fn applicant() -> IntakeForm {
    IntakeForm {
        full_name: "Meera Iyer".into(),
        date_of_birth: "1985-11-02".into(),
        national_id: "123456789012".into(),
        region: "central".into(),
        sub_region: "central-2".into(),
        email: "meera@example.org".into(),
        phone: "9876543210".into(),
        consent_given: true,
        ..Default::default()
    }
}

async fn through_identity(s: &mut Session) {
    s.submit_intake(&applicant()).expect("valid intake");
    s.send_code().await.expect("code sent");
    assert_eq!(
        s.submit_code("000000").await.expect("submitted"),
        IdentityOutcome::Verified
    );
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn full_session_issues_exactly_one_success_result() {
    let mut s = session_with(NullRandom::favourable());
    let mut events = s.progress();

    through_identity(&mut s).await;
    assert_eq!(s.stage(), Stage::Biometric);

    s.run_biometrics().await.unwrap();
    assert_eq!(s.stage(), Stage::Duplicate);

    let scan = s.run_duplicate_scan().await.unwrap();
    assert_eq!(scan.verdict, DuplicateVerdict::Clear);
    assert_eq!(scan.confidence_score, 98);
    assert_eq!(scan.partitions_scanned, 28);
    assert_eq!(s.stage(), Stage::Mobility);

    let result = s.decide_mobility(MobilityDecision::Stay).await.unwrap();
    assert_eq!(s.stage(), Stage::Complete);
    assert_eq!(result.outcome, VerificationOutcome::Success);
    assert!(result.verification_id.as_str().starts_with("VVP-"));
    assert_eq!(
        result.snapshot.binding,
        ConstituencyBinding::new("central", "central-2")
    );

    let status = s.status();
    assert_eq!(status.identity, CheckStatus::Verified);
    assert_eq!(status.biometric, CheckStatus::Verified);
    assert_eq!(status.duplicate, DuplicateStatus::Clear);
    assert_eq!(s.stage_history(), &Stage::ALL);

    let mut issued = 0;
    while let Ok(event) = events.try_recv() {
        if let ProgressEvent::ResultIssued { outcome, .. } = event {
            assert_eq!(outcome, VerificationOutcome::Success);
            issued += 1;
        }
    }
    assert_eq!(issued, 1);

    // Nothing moves the session past Complete.
    assert!(s.proceed().is_err());
    assert!(s.decide_mobility(MobilityDecision::Stay).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn relocation_is_carried_into_the_result() {
    let mut s = session_with(NullRandom::favourable());
    through_identity(&mut s).await;
    s.run_biometrics().await.unwrap();
    s.run_duplicate_scan().await.unwrap();

    let result = s
        .decide_mobility(MobilityDecision::relocate("coastal", "coastal-1"))
        .await
        .unwrap();
    assert_eq!(
        result.snapshot.binding,
        ConstituencyBinding::new("coastal", "coastal-1")
    );
    assert_eq!(s.record().binding, result.snapshot.binding);
}

#[tokio::test(start_paused = true)]
async fn session_runs_from_config_with_fast_params() {
    let config = SessionConfig::from_toml_str(
        r#"
        [params]
        otp_delivery_ms = 1
        otp_verify_ms = 1
        clear_probability = 1.0

        [regions]
        central = ["central-2"]
        "#,
    )
    .unwrap();
    let mut s = Session::from_config(&config);
    through_identity(&mut s).await;
    s.run_biometrics().await.unwrap();
    assert!(s.run_duplicate_scan().await.unwrap().is_clear());
    s.decide_mobility(MobilityDecision::Stay).await.unwrap();
    assert_eq!(s.stage(), Stage::Complete);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn otp_acceptance_rate_tracks_configured_probability() {
    let mut accepted = 0;
    let trials = 400;
    for _ in 0..trials {
        let mut s = session_with(OsRandom);
        s.submit_intake(&applicant()).unwrap();
        s.send_code().await.unwrap();
        if s.submit_code("482913").await.unwrap() == IdentityOutcome::Verified {
            accepted += 1;
        }
    }
    // 0.8 acceptance: the mean is 320 with a standard deviation of 8.
    assert!((260..=380).contains(&accepted), "accepted {accepted}/{trials}");
}

#[tokio::test(start_paused = true)]
async fn malformed_code_is_rejected_before_any_check() {
    let random = Arc::new(NullRandom::favourable());
    let mut s = Session::new(WorkflowParams::default(), regions())
        .with_clock(Arc::new(NullClock::default()))
        .with_random(random.clone());
    s.submit_intake(&applicant()).unwrap();
    s.send_code().await.unwrap();

    for bad in ["12345", "1234567", "12a456", ""] {
        assert!(matches!(
            s.submit_code(bad).await,
            Err(WorkflowError::Validation(_))
        ));
    }
    assert_eq!(s.status().identity, CheckStatus::Pending);
    assert_eq!(random.draws(), 0);
}

#[tokio::test(start_paused = true)]
async fn identity_cannot_be_skipped_by_biometric_calls() {
    let mut s = session_with(NullRandom::favourable());
    s.submit_intake(&applicant()).unwrap();
    s.send_code().await.unwrap();

    assert!(matches!(
        s.run_capture(BiometricKind::Face).await,
        Err(WorkflowError::StageMismatch { .. })
    ));
    assert!(matches!(
        s.proceed(),
        Err(WorkflowError::StageIncomplete(Stage::Identity))
    ));
    assert_eq!(s.status().biometric, CheckStatus::Pending);
}

// ---------------------------------------------------------------------------
// Duplicate scan
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn flagged_session_is_routed_to_review() {
    let mut s = session_with(NullRandom::unfavourable());
    through_identity(&mut s).await;
    s.run_biometrics().await.unwrap();

    let scan = s.run_duplicate_scan().await.unwrap();
    assert_eq!(scan.verdict, DuplicateVerdict::Flagged);
    assert_eq!(scan.confidence_score, 87);
    assert_eq!(scan.matched_record_count, 1);

    let result = s.verification_result().expect("pending review result");
    assert_eq!(result.outcome, VerificationOutcome::PendingReview);
    let case = s.flagged_case().expect("case opened");
    assert!(case.case_id.starts_with("CASE-"));
    assert_eq!(case.binding, ConstituencyBinding::new("central", "central-2"));

    assert_eq!(s.stage(), Stage::Duplicate);
    assert!(matches!(
        s.decide_mobility(MobilityDecision::Stay).await,
        Err(WorkflowError::AwaitingReview)
    ));
}

#[tokio::test(start_paused = true)]
async fn cancelled_capture_restarts_from_zero() {
    let mut s = session_with(NullRandom::favourable());
    through_identity(&mut s).await;

    let dropped =
        tokio::time::timeout(Duration::from_millis(700), s.run_capture(BiometricKind::Face)).await;
    assert!(dropped.is_err());
    assert_eq!(s.status().biometric, CheckStatus::Verifying);
    assert!(!s.biometric().state(BiometricKind::Face).is_success());

    s.run_biometrics().await.unwrap();
    assert_eq!(s.status().biometric, CheckStatus::Verified);
    assert_eq!(s.stage(), Stage::Duplicate);
}

// ---------------------------------------------------------------------------
// Reset and observation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn reset_from_any_stage_is_idempotent() {
    let mut s = session_with(NullRandom::favourable());
    through_identity(&mut s).await;
    s.run_biometrics().await.unwrap();
    s.run_duplicate_scan().await.unwrap();
    s.decide_mobility(MobilityDecision::Stay).await.unwrap();

    s.reset();
    let once = s.snapshot();
    s.reset();
    assert_eq!(s.snapshot(), once);

    assert_eq!(s.stage(), Stage::Intake);
    assert!(s.status().is_pending());
    assert!(s.record().is_empty());
    assert!(s.verification_result().is_none());
    assert!(s.duplicate_result().is_none());
    assert!(s.flagged_case().is_none());
    assert!(s.overrides().is_empty());

    // A fresh run works after reset.
    through_identity(&mut s).await;
    assert_eq!(s.stage(), Stage::Biometric);
}

#[tokio::test(start_paused = true)]
async fn reset_releases_a_flagged_session() {
    let mut s = session_with(NullRandom::unfavourable());
    through_identity(&mut s).await;
    s.run_biometrics().await.unwrap();
    s.run_duplicate_scan().await.unwrap();
    assert!(s.flagged_case().is_some());

    s.reset();
    let once = s.snapshot();
    s.reset();
    assert_eq!(s.snapshot(), once);

    assert!(s.flagged_case().is_none());
    assert!(s.subscribe().borrow().flagged.is_none());
    assert!(s.verification_result().is_none());
    assert_eq!(s.status().duplicate, DuplicateStatus::Pending);
    assert_eq!(s.stage(), Stage::Intake);

    // The review hold is gone: intake is accepted again.
    s.submit_intake(&applicant()).unwrap();
    assert_eq!(s.stage(), Stage::Identity);
}

#[tokio::test(start_paused = true)]
async fn watchers_observe_every_stage() {
    let mut s = session_with(NullRandom::favourable());
    let mut view = s.subscribe();
    let initial = view.borrow_and_update().stage;
    let watcher = tokio::spawn(async move {
        let mut seen = vec![initial];
        while view.changed().await.is_ok() {
            let stage = view.borrow_and_update().stage;
            if seen.last() != Some(&stage) {
                seen.push(stage);
            }
            if stage == Stage::Complete {
                break;
            }
        }
        seen
    });

    through_identity(&mut s).await;
    tokio::task::yield_now().await;
    s.run_biometrics().await.unwrap();
    tokio::task::yield_now().await;
    s.run_duplicate_scan().await.unwrap();
    tokio::task::yield_now().await;
    s.decide_mobility(MobilityDecision::Stay).await.unwrap();

    let seen = watcher.await.unwrap();
    assert_eq!(seen.first(), Some(&Stage::Intake));
    assert_eq!(seen.last(), Some(&Stage::Complete));
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(start_paused = true)]
async fn skip_override_is_audited() {
    let mut s = session_with(NullRandom::favourable());
    through_identity(&mut s).await;

    s.skip_to(Stage::Mobility, "biometric kiosk offline").unwrap();
    let ov = &s.overrides()[0];
    assert_eq!(ov.from, Stage::Biometric);
    assert_eq!(ov.bypassed, vec![Stage::Biometric, Stage::Duplicate]);
    assert_eq!(ov.reason, "biometric kiosk offline");

    let result = s.decide_mobility(MobilityDecision::Stay).await.unwrap();
    assert_eq!(result.outcome, VerificationOutcome::Success);
    assert!(matches!(
        s.skip_to(Stage::Mobility, "again"),
        Err(WorkflowError::ResultAlreadyIssued)
    ));
}
