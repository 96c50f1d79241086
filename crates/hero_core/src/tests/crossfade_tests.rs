use super::*;
use crate::test_support::{run_due, FakeMedia};

fn pair(primary: &FakeMedia, secondary: &FakeMedia) -> VideoCrossfadeScheduler {
    VideoCrossfadeScheduler::new(
        primary.boxed(),
        secondary.boxed(),
        CrossfadeTiming::default(),
    )
}

fn active_count(scheduler: &VideoCrossfadeScheduler) -> usize {
    [VideoChannelId::Primary, VideoChannelId::Secondary]
        .into_iter()
        .filter(|id| scheduler.channel(*id).is_active)
        .count()
}

fn frames(
    crossfade: &mut VideoCrossfadeScheduler,
    scheduler: &mut Scheduler<HeroTask>,
    now_ms: u64,
) -> Vec<SwapOutcome> {
    let mut outcomes = Vec::new();
    run_due(scheduler, now_ms, |_, task| {
        if task == HeroTask::CrossfadeCheck {
            outcomes.push(crossfade.on_frame());
        }
    });
    outcomes
}

#[test]
fn swaps_to_standby_channel_one_second_before_the_end() {
    let primary = FakeMedia::with_duration(12.0);
    let secondary = FakeMedia::with_duration(12.0);
    let mut crossfade = pair(&primary, &secondary);
    crossfade.start();
    assert!(!primary.paused());
    assert!(secondary.paused(), "standby is primed then paused");

    primary.set_time(10.9);
    assert_eq!(crossfade.check(), SwapOutcome::NotDue);
    assert_eq!(crossfade.transition_point(), Some(11.0));

    primary.set_time(11.0);
    secondary.set_time(4.2);
    assert_eq!(
        crossfade.check(),
        SwapOutcome::Swapped(VideoChannelId::Secondary)
    );
    assert_eq!(crossfade.active(), VideoChannelId::Secondary);
    assert_eq!(secondary.time(), 0.0);
    assert!(!secondary.paused());
    assert!(!primary.paused(), "outgoing channel runs to completion");
    assert_eq!(active_count(&crossfade), 1);
}

#[test]
fn rejected_swap_keeps_current_channel() {
    let primary = FakeMedia::with_duration(8.0);
    let secondary = FakeMedia::with_duration(8.0);
    let mut crossfade = pair(&primary, &secondary);
    crossfade.start();
    secondary.reject_with("decoder busy");

    primary.set_time(7.5);
    assert!(matches!(crossfade.check(), SwapOutcome::Failed(_)));
    assert_eq!(crossfade.active(), VideoChannelId::Primary);
    assert_eq!(crossfade.state(), SwapState::Idle);

    secondary.allow_play();
    assert_eq!(
        crossfade.check(),
        SwapOutcome::Swapped(VideoChannelId::Secondary)
    );
}

#[test]
fn unknown_duration_means_not_ready() {
    let primary = FakeMedia::new();
    let secondary = FakeMedia::new();
    let mut crossfade = pair(&primary, &secondary);
    crossfade.start();

    primary.set_time(600.0);
    assert_eq!(crossfade.check(), SwapOutcome::NotReady);
    assert_eq!(crossfade.active(), VideoChannelId::Primary);
    // Only the priming play; the standby was never swapped in.
    assert_eq!(secondary.play_calls(), 1);
}

#[test]
fn clips_shorter_than_the_lead_never_loop() {
    let primary = FakeMedia::with_duration(0.8);
    let secondary = FakeMedia::with_duration(0.8);
    let mut crossfade = pair(&primary, &secondary);
    crossfade.on_metadata(VideoChannelId::Primary);
    assert_eq!(crossfade.transition_point(), None);
}

#[test]
fn transition_point_is_frozen_after_first_metadata() {
    let primary = FakeMedia::with_duration(20.0);
    let secondary = FakeMedia::with_duration(20.4);
    let mut crossfade = pair(&primary, &secondary);

    crossfade.on_metadata(VideoChannelId::Secondary);
    crossfade.on_metadata(VideoChannelId::Primary);
    assert_eq!(crossfade.transition_point(), Some(19.4));

    primary.set_duration(Some(30.0));
    crossfade.on_metadata(VideoChannelId::Primary);
    assert_eq!(crossfade.transition_point(), Some(19.4));
}

#[test]
fn time_updates_are_throttled_and_checked_on_next_frame() {
    let primary = FakeMedia::with_duration(12.0);
    let secondary = FakeMedia::with_duration(12.0);
    let mut crossfade = pair(&primary, &secondary);
    let mut scheduler = Scheduler::new();
    crossfade.start();
    primary.set_time(11.5);

    scheduler.begin_tick(0);
    crossfade.on_time_update(VideoChannelId::Primary, 0, &mut scheduler);
    crossfade.on_time_update(VideoChannelId::Primary, 40, &mut scheduler);
    crossfade.on_time_update(VideoChannelId::Secondary, 50, &mut scheduler);
    assert_eq!(scheduler.pending(), 1, "one frame request");
    assert_eq!(crossfade.active(), VideoChannelId::Primary, "deferred");

    let outcomes = frames(&mut crossfade, &mut scheduler, 16);
    assert_eq!(outcomes, vec![SwapOutcome::Swapped(VideoChannelId::Secondary)]);

    // Within 100ms of the accepted sample: dropped.
    crossfade.on_time_update(VideoChannelId::Secondary, 90, &mut scheduler);
    assert_eq!(scheduler.pending(), 0);
    crossfade.on_time_update(VideoChannelId::Secondary, 100, &mut scheduler);
    assert_eq!(scheduler.pending(), 1);
}

#[test]
fn exactly_one_channel_active_across_many_loops() {
    let primary = FakeMedia::with_duration(5.0);
    let secondary = FakeMedia::with_duration(5.0);
    let mut crossfade = pair(&primary, &secondary);
    crossfade.start();

    for lap in 0..12 {
        let active = crossfade.active();
        let media = match active {
            VideoChannelId::Primary => &primary,
            VideoChannelId::Secondary => &secondary,
        };
        if lap % 3 == 2 {
            let standby = match active {
                VideoChannelId::Primary => &secondary,
                VideoChannelId::Secondary => &primary,
            };
            standby.reject_with("transient");
            media.set_time(4.2);
            crossfade.check();
            standby.allow_play();
        }
        media.set_time(4.5);
        crossfade.check();
        assert_eq!(active_count(&crossfade), 1, "lap {lap}");
        assert_ne!(crossfade.active(), active);
    }
}

#[test]
fn teardown_releases_both_channels() {
    let primary = FakeMedia::with_duration(12.0);
    let secondary = FakeMedia::with_duration(12.0);
    let mut crossfade = pair(&primary, &secondary);
    let mut scheduler = Scheduler::new();
    crossfade.set_source("/loft-video.webm");
    crossfade.start();
    crossfade.on_time_update(VideoChannelId::Primary, 0, &mut scheduler);

    crossfade.teardown(&mut scheduler);
    assert_eq!(scheduler.pending(), 0);
    for media in [&primary, &secondary] {
        assert!(media.paused());
        assert_eq!(media.source(), None);
        assert_eq!(media.load_calls(), 1);
    }
}
