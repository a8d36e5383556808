use std::time::{Duration, Instant};

use kioskview::headless::{HeadlessView, ViewCommand};
use kioskview::managers::idle_controller::{
    IdleController, IdleControllerTrait, IdleState, RESUME_DEBOUNCE,
};
use kioskview::page::scripts;
use kioskview::services::url_classifier::UrlClassifier;
use kioskview::types::view::{EmbeddedViewTrait, ScriptPurpose};

const HOME: &str = "https://nvr.local/protect/dashboard";
const AWAY: &str = "https://nvr.local/protect/devices";
const TIMEOUT: Duration = Duration::from_secs(60);

fn controller() -> IdleController {
    IdleController::new(TIMEOUT.as_secs() as i64, UrlClassifier::default())
}

fn overlay_shows(view: &HeadlessView) -> usize {
    view.scripts(|p| *p == ScriptPurpose::IdleOverlay)
        .into_iter()
        .filter(|s| *s != scripts::hide_idle_overlay())
        .count()
}

fn overlay_hides(view: &HeadlessView) -> usize {
    view.scripts(|p| *p == ScriptPurpose::IdleOverlay)
        .into_iter()
        .filter(|s| *s == scripts::hide_idle_overlay())
        .count()
}

/// Moves the view to `url` the way a user click would and reports it.
fn go(idle: &mut IdleController, view: &mut HeadlessView, url: &str, now: Instant) {
    view.set_current_url(url);
    idle.on_navigation(url, now, view);
}

#[test]
fn test_disabled_controller_never_starts() {
    for timeout in [0, -5] {
        let mut idle = IdleController::new(timeout, UrlClassifier::default());
        let mut view = HeadlessView::at(HOME);
        let t0 = Instant::now();

        go(&mut idle, &mut view, AWAY, t0);
        idle.on_activity(t0, &mut view);
        idle.on_zoom_changed(true, t0, &mut view);
        idle.poll(t0 + Duration::from_secs(3600), HOME, &mut view);

        assert_eq!(idle.state(), IdleState::Disabled);
        assert!(idle.next_deadline().is_none());
        assert!(view.commands().is_empty());
    }
}

#[test]
fn test_navigating_away_starts_countdown_with_overlay() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();

    go(&mut idle, &mut view, AWAY, t0);

    assert_eq!(idle.state(), IdleState::Away);
    assert_eq!(idle.deadline(), Some(t0 + TIMEOUT));
    assert_eq!(overlay_shows(&view), 1);
}

#[test]
fn test_returning_home_before_timeout_cancels_without_navigation() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();

    go(&mut idle, &mut view, AWAY, t0);
    go(&mut idle, &mut view, HOME, t0 + Duration::from_secs(10));
    idle.poll(t0 + TIMEOUT * 2, HOME, &mut view);

    assert_eq!(idle.state(), IdleState::Home);
    assert!(view.navigations().is_empty());
    assert_eq!(overlay_hides(&view), 1);
}

#[test]
fn test_expiry_navigates_home_exactly_once() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();

    go(&mut idle, &mut view, AWAY, t0);
    idle.poll(t0 + TIMEOUT - Duration::from_millis(1), HOME, &mut view);
    assert!(view.navigations().is_empty());

    idle.poll(t0 + TIMEOUT, HOME, &mut view);
    idle.poll(t0 + TIMEOUT + Duration::from_secs(5), HOME, &mut view);
    idle.poll(t0 + TIMEOUT * 3, HOME, &mut view);

    assert_eq!(view.navigations(), vec![HOME]);
    assert_eq!(idle.state(), IdleState::Home);
}

#[test]
fn test_navigating_away_again_restarts_single_countdown() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();

    go(&mut idle, &mut view, AWAY, t0);
    let t1 = t0 + Duration::from_secs(30);
    go(&mut idle, &mut view, "https://nvr.local/protect/timelapse", t1);

    assert_eq!(idle.deadline(), Some(t1 + TIMEOUT));
    idle.poll(t0 + TIMEOUT, HOME, &mut view);
    assert!(view.navigations().is_empty());
    idle.poll(t1 + TIMEOUT, HOME, &mut view);
    assert_eq!(view.navigations().len(), 1);
}

#[test]
fn test_activity_burst_rearms_once_after_quiet_period() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, AWAY, t0);
    view.clear();

    let mut last = t0;
    for i in 1..=5 {
        last = t0 + Duration::from_millis(200 * i);
        idle.on_activity(last, &mut view);
        idle.poll(last, HOME, &mut view);
        assert!(idle.deadline().is_none(), "countdown must stay cancelled during input");
    }
    assert_eq!(overlay_hides(&view), 1);
    assert!(idle.is_resume_pending());

    idle.poll(last + RESUME_DEBOUNCE - Duration::from_millis(1), HOME, &mut view);
    assert_eq!(overlay_shows(&view), 0);

    idle.poll(last + RESUME_DEBOUNCE, HOME, &mut view);
    assert_eq!(overlay_shows(&view), 1);
    assert_eq!(idle.deadline(), Some(last + RESUME_DEBOUNCE + TIMEOUT));
    assert_eq!(idle.state(), IdleState::Away);
}

#[test]
fn test_activity_on_home_does_not_rearm() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, HOME, t0);

    idle.on_activity(t0, &mut view);
    idle.poll(t0 + RESUME_DEBOUNCE, HOME, &mut view);

    assert_eq!(idle.state(), IdleState::Home);
    assert!(idle.next_deadline().is_none());
    assert!(view.commands().is_empty());
}

#[test]
fn test_zoom_on_dashboard_overrides_exemption() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, HOME, t0);

    idle.on_zoom_changed(true, t0, &mut view);
    assert_eq!(idle.state(), IdleState::ZoomedOverride);
    assert_eq!(idle.deadline(), Some(t0 + TIMEOUT));

    idle.on_zoom_changed(false, t0 + Duration::from_secs(5), &mut view);
    assert_eq!(idle.state(), IdleState::Home);
    assert_eq!(overlay_hides(&view), 1);
}

#[test]
fn test_zoom_off_away_from_home_keeps_counting() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, AWAY, t0);

    idle.on_zoom_changed(false, t0, &mut view);
    assert_eq!(idle.state(), IdleState::Away);
}

#[test]
fn test_expiry_while_zoomed_on_dashboard_exits_zoom_instead_of_navigating() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, HOME, t0);
    idle.on_zoom_changed(true, t0, &mut view);

    idle.poll(t0 + TIMEOUT, HOME, &mut view);

    assert!(view.navigations().is_empty());
    assert_eq!(
        view.scripts(|p| *p == ScriptPurpose::ExitZoomedView),
        vec![scripts::exit_zoomed_view()]
    );
    assert_eq!(idle.state(), IdleState::Home);
}

#[test]
fn test_navigating_to_dashboard_while_zoomed_keeps_counting() {
    let mut idle = controller();
    let mut view = HeadlessView::at(AWAY);
    let t0 = Instant::now();
    idle.on_zoom_changed(true, t0, &mut view);

    go(&mut idle, &mut view, HOME, t0 + Duration::from_secs(1));

    assert_eq!(idle.state(), IdleState::ZoomedOverride);
}

#[test]
fn test_dom_ready_restores_overlay_with_remaining_time() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, AWAY, t0);
    view.clear();

    idle.on_dom_ready(t0 + Duration::from_secs(20), &mut view);

    let shown = view.scripts(|p| *p == ScriptPurpose::IdleOverlay);
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("(40000)"));
}

#[test]
fn test_dom_ready_without_countdown_injects_nothing() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    idle.on_dom_ready(Instant::now(), &mut view);
    assert!(view.commands().is_empty());
}

#[test]
fn test_next_deadline_tracks_countdown_and_debounce() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, AWAY, t0);
    assert_eq!(idle.next_deadline(), Some(t0 + TIMEOUT));

    idle.on_activity(t0 + Duration::from_secs(2), &mut view);
    assert_eq!(
        idle.next_deadline(),
        Some(t0 + Duration::from_secs(2) + RESUME_DEBOUNCE)
    );
}

#[test]
fn test_reevaluation_uses_view_url() {
    let mut idle = controller();
    let mut view = HeadlessView::at(HOME);
    let t0 = Instant::now();
    go(&mut idle, &mut view, AWAY, t0);
    idle.on_activity(t0, &mut view);

    // The view came home without a navigation event reaching us
    view.set_current_url(HOME);
    idle.poll(t0 + RESUME_DEBOUNCE, HOME, &mut view);

    assert_eq!(idle.state(), IdleState::Home);
    assert!(!view
        .commands()
        .iter()
        .any(|c| matches!(c, ViewCommand::Navigate(_))));
    assert_eq!(view.current_url().as_deref(), Some(HOME));
}
