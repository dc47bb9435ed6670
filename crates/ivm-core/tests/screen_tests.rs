use ivm_barrier::{BarrierConfig, PhaseState};
use ivm_core::prelude::*;
use ivm_core::DelayedProbe;
use ivm_generation::{TaskStatus, GENERIC_FAILURE_MESSAGE};
use ivm_history::{InMemoryRemoteStore, DEFAULT_CAPACITY};
use ivm_test_utils::{
    failing_service, memory_router, numbered_records, succeeding_service, FailingLocalStore,
    SAMPLE_COMPANY, SAMPLE_JOB_DESCRIPTION,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn filled_setup(
    service: Arc<dyn GenerationService>,
    router: Arc<HistoryRouter>,
    auth: AuthState,
) -> InterviewSetup {
    let mut setup = InterviewSetup::new(service, router, auth);
    setup.set_company_name(SAMPLE_COMPANY);
    setup.set_job_description(SAMPLE_JOB_DESCRIPTION);
    setup
}

#[tokio::test(start_paused = true)]
async fn splash_survives_missing_logo() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let auth = AuthState::new();
    let splash = SplashScreen::mount(
        BarrierConfig::new(),
        SplashResources {
            fonts: Arc::new(DelayedProbe::ready_after("fonts", Duration::from_millis(300))),
            logo: Arc::new(DelayedProbe::failing_after(
                "logo",
                Duration::from_millis(1_000),
                "404",
            )),
            auth: auth.clone(),
        },
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(splash.phase(), PhaseState::Settled);
    auth.resolve(None);

    splash.finished().await;
    assert_eq!(splash.elapsed(), Duration::from_millis(3_200));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn guest_generation_lands_in_local_history() {
    let (router, remote) = memory_router();
    let setup = filled_setup(
        succeeding_service(Duration::from_millis(1_200)),
        router.clone(),
        AuthState::resolved_with(None),
    );
    assert!(setup.can_generate());

    let start = Instant::now();
    let interview = setup.generate().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(6_500));
    assert_eq!(setup.progress().status, TaskStatus::Succeeded);
    assert_eq!(interview.questions.len(), 3);

    let saved = router.load_local();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].company, SAMPLE_COMPANY);
    assert_eq!(remote.count("ada"), 0);
}

#[tokio::test(start_paused = true)]
async fn signed_in_generation_goes_remote() {
    let (router, remote) = memory_router();
    let ada = Identity::new("ada").with_display_name("Ada");
    let setup = filled_setup(
        succeeding_service(Duration::from_millis(200)),
        router.clone(),
        AuthState::resolved_with(Some(ada)),
    );

    assert!(setup.generate().await.is_some());
    assert_eq!(remote.count("ada"), 1);
    assert!(router.load_local().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_generation_saves_nothing() {
    let (router, _) = memory_router();
    let setup = filled_setup(
        failing_service(Duration::from_millis(800), "network-error"),
        router.clone(),
        AuthState::resolved_with(None),
    );

    assert!(setup.generate().await.is_none());
    assert_eq!(setup.error().as_deref(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(setup.progress().progress, 0.0);
    assert!(router.load_local().is_empty());
}

#[tokio::test(start_paused = true)]
async fn broken_local_storage_never_fails_generation() {
    let router = Arc::new(HistoryRouter::new(
        FailingLocalStore::new(),
        Arc::new(InMemoryRemoteStore::new()),
        DEFAULT_CAPACITY,
    ));
    let setup = filled_setup(
        succeeding_service(Duration::ZERO),
        router.clone(),
        AuthState::resolved_with(None),
    );

    assert!(setup.generate().await.is_some());
    assert!(router.load_local().is_empty());
}

#[tokio::test(start_paused = true)]
async fn landing_swaps_to_remote_history_on_resolve() {
    let (router, _) = memory_router();
    for record in numbered_records(3) {
        router.save(None, record).await;
    }
    let ada = Identity::new("ada");
    router
        .save(Some(&ada), SessionRecord::new("Remote Co", vec![]))
        .await;

    let auth = AuthState::new();
    let page = LandingPage::mount(
        router,
        auth.clone(),
        SessionFlags::new(),
        Duration::from_millis(2_000),
    )
    .unwrap();
    assert_eq!(page.history().len(), 3);

    auth.resolve(Some(ada));
    tokio::time::sleep(Duration::from_millis(1)).await;
    let companies: Vec<_> = page.history().into_iter().map(|r| r.company).collect();
    assert_eq!(companies, vec!["Remote Co".to_string()]);

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert!(!page.auth_prompt_open());
}

#[tokio::test(start_paused = true)]
async fn sign_in_cancels_pending_prompt() {
    let (router, _) = memory_router();
    let auth = AuthState::resolved_with(None);
    let page = LandingPage::mount(
        router,
        auth.clone(),
        SessionFlags::new(),
        Duration::from_millis(2_000),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    auth.sign_in(Identity::new("ada"));

    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert!(!page.auth_prompt_open());
    assert!(page.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn prompt_auto_opens_only_once() {
    let (router, _) = memory_router();
    let auth = AuthState::resolved_with(None);
    let page = LandingPage::mount(
        router,
        auth.clone(),
        SessionFlags::new(),
        Duration::from_millis(2_000),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(2_001)).await;
    assert!(page.auth_prompt_open());

    // closing after sign-in, then signing out, must not reopen it
    auth.sign_in(Identity::new("ada"));
    page.dismiss_auth_prompt();
    auth.sign_out();
    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert!(!page.auth_prompt_open());
}

#[tokio::test(start_paused = true)]
async fn recorded_session_shows_up_in_history() {
    let (router, remote) = memory_router();
    let auth = AuthState::resolved_with(Some(Identity::new("ada")));
    let page = LandingPage::mount(
        router,
        auth,
        SessionFlags::new(),
        Duration::from_millis(2_000),
    )
    .unwrap();

    page.record_session(SessionRecord::new("Acme", vec!["Why?".into()]))
        .await;
    assert_eq!(page.history().len(), 1);
    assert_eq!(remote.count("ada"), 1);
}
