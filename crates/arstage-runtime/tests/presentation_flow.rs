use std::collections::BTreeSet;

use tokio::sync::mpsc::UnboundedReceiver;

use arstage_core::{Duration, ExperienceConfig};
use arstage_media::{PlaybackStatus, SimulatedBackend};
use arstage_runtime::visibility;
use arstage_runtime::{
    Directive, Experience, PlaceholderAssets, Presentation, PresentationState, TrackingLifecycle,
    Trigger, TriggerSink,
};
use arstage_scene::{Action, Collection, ContentId};

struct Fixture {
    presentation: Presentation,
    tracking: TrackingLifecycle,
    notices: UnboundedReceiver<Trigger>,
}

fn fixture_with(media: SimulatedBackend) -> Fixture {
    let config = ExperienceConfig::default();
    let mut exp = Experience::assemble(&config, &PlaceholderAssets, &media).unwrap();
    let (sink, notices) = TriggerSink::channel();
    exp.presentation.set_sink(sink);
    Fixture {
        presentation: exp.presentation,
        tracking: TrackingLifecycle::new(),
        notices,
    }
}

fn fixture() -> Fixture {
    fixture_with(SimulatedBackend::new().with_default_duration(Duration::from_seconds(2.0)))
}

impl Fixture {
    fn found(&mut self) -> Vec<Directive> {
        self.tracking.on_found(&mut self.presentation)
    }

    fn lost(&mut self) {
        self.tracking.on_lost(&mut self.presentation)
    }

    fn act(&mut self, action: Action) -> Vec<Directive> {
        self.presentation.handle(Trigger::Action(action))
    }

    fn to_menu(&mut self) {
        self.found();
        self.presentation.handle(Trigger::IntroElapsed);
        assert_eq!(self.presentation.state(), PresentationState::Menu);
    }

    /// Advance media by `delta` and feed any completion notices back.
    fn tick(&mut self, delta: f64) {
        self.presentation.tick(Duration::from_seconds(delta));
        while let Ok(trigger) = self.notices.try_recv() {
            self.presentation.handle(trigger);
        }
    }

    fn visible(&self) -> BTreeSet<ContentId> {
        self.presentation.registry().visible_ids().into_iter().collect()
    }

    fn declared(&self) -> BTreeSet<ContentId> {
        visibility::declared_visible(
            self.presentation.registry(),
            self.presentation.state(),
            self.presentation.cards_revealed(),
        )
    }

    fn ids(&self, collection: Collection) -> BTreeSet<ContentId> {
        self.presentation
            .registry()
            .collection(collection)
            .iter()
            .cloned()
            .collect()
    }

    fn avatar_position(&self) -> glam::Vec3 {
        let reg = self.presentation.registry();
        reg.get(reg.avatar().unwrap()).unwrap().placement.position
    }

    fn step(&self) -> Option<usize> {
        self.presentation.sequence().map(|s| s.step)
    }

    fn playing_videos(&self) -> Vec<usize> {
        self.presentation
            .registry()
            .videos()
            .enumerate()
            .filter(|(_, v)| v.is_playing())
            .map(|(i, _)| i)
            .collect()
    }
}

#[test]
fn fresh_start_reaches_menu_after_intro_delay() {
    let mut f = fixture();
    assert_eq!(f.presentation.state(), PresentationState::Idle);
    assert!(f.visible().is_empty());

    let directives = f.found();
    assert_eq!(f.presentation.state(), PresentationState::Intro);
    assert_eq!(
        directives,
        vec![Directive::Wake {
            after: Duration::from_seconds(8.0),
            trigger: Trigger::IntroElapsed,
        }]
    );
    assert!(f.presentation.narration().is_playing());
    assert!(f.presentation.mixer().is_playing());
    assert_eq!(f.visible(), f.ids(Collection::Avatar));

    f.presentation.handle(Trigger::IntroElapsed);
    assert_eq!(f.presentation.state(), PresentationState::Menu);
    let menu = f.ids(Collection::MenuButtons);
    assert_eq!(menu.len(), 3);
    assert!(menu.is_subset(&f.visible()));
    assert!(f.ids(Collection::BackButton).is_disjoint(&f.visible()));
    assert!(f.ids(Collection::CaseStudyButtons).is_disjoint(&f.visible()));
}

#[test]
fn visible_set_matches_declared_set_in_every_state() {
    let mut f = fixture();
    assert_eq!(f.visible(), f.declared());
    f.found();
    assert_eq!(f.visible(), f.declared());
    f.presentation.handle(Trigger::IntroElapsed);
    assert_eq!(f.visible(), f.declared());

    for action in [Action::OurContent, Action::CaseStudies, Action::AboutUs] {
        f.act(action);
        assert_eq!(f.visible(), f.declared(), "after {}", action);
        if action == Action::CaseStudies {
            f.act(Action::ShowCaseStudies);
            assert_eq!(f.visible(), f.declared());
        }
        f.act(Action::Back);
        assert_eq!(f.presentation.state(), PresentationState::Menu);
        assert_eq!(f.visible(), f.declared(), "back from {}", action);
        assert!(f.ids(Collection::CaseStudyCards).is_disjoint(&f.visible()));
        assert!(f.ids(Collection::VideoSurfaces).is_disjoint(&f.visible()));
    }
}

#[test]
fn our_content_starts_at_step_zero() {
    let mut f = fixture();
    f.to_menu();
    let directives = f.act(Action::OurContent);
    assert_eq!(f.presentation.state(), PresentationState::ContentSequence);
    assert_eq!(f.step(), Some(0));
    assert_eq!(f.avatar_position(), f.presentation.steps()[0].avatar_position);
    assert_eq!(f.playing_videos(), vec![0]);
    assert_eq!(f.presentation.playing_count(), 1);
    assert!(f.ids(Collection::VideoSurfaces).is_subset(&f.visible()));
    let run = f.presentation.sequence().unwrap().run;
    assert_eq!(
        directives,
        vec![Directive::Wake {
            after: Duration::from_seconds(90.0),
            trigger: Trigger::StepTimedOut { run, step: 0 },
        }]
    );
}

#[test]
fn sequence_plays_each_step_once_and_returns_to_menu() {
    let mut f = fixture();
    f.to_menu();
    f.act(Action::OurContent);

    let mut visited = vec![0];
    for _ in 0..200 {
        f.tick(0.25);
        assert!(f.presentation.playing_count() <= 1);
        if f.presentation.state() != PresentationState::ContentSequence {
            break;
        }
        let step = f.step().unwrap();
        if visited.last() != Some(&step) {
            visited.push(step);
            assert_eq!(f.avatar_position(), f.presentation.steps()[step].avatar_position);
        }
    }
    assert_eq!(visited, vec![0, 1, 2, 3]);
    assert_eq!(f.presentation.state(), PresentationState::Menu);
    assert_eq!(f.avatar_position(), f.presentation.settings().center);
    assert!(f.presentation.sequence().is_none());
    assert_eq!(f.visible(), f.declared());
}

#[test]
fn lost_mid_sequence_then_found_restarts_from_step_zero() {
    let mut f = fixture();
    f.to_menu();
    f.act(Action::OurContent);
    while f.step() != Some(2) {
        f.tick(0.5);
    }
    let old_run = f.presentation.sequence().unwrap().run;

    f.lost();
    assert_eq!(f.presentation.state(), PresentationState::ContentSequence);
    assert_eq!(f.step(), Some(2));
    assert!(f.presentation.sequence().unwrap().suspended);
    assert_eq!(f.presentation.playing_count(), 0);

    // Paused clips never finish, so nothing advances while lost.
    f.tick(10.0);
    assert_eq!(f.step(), Some(2));

    f.found();
    let run = f.presentation.sequence().unwrap();
    assert_eq!(run.step, 0);
    assert!(run.run > old_run);
    assert!(!run.suspended);
    assert_eq!(f.playing_videos(), vec![0]);

    // A notice from the cancelled run cannot move the new one.
    f.presentation.handle(Trigger::StepFinished { run: old_run, step: 2 });
    f.presentation.handle(Trigger::StepTimedOut { run: old_run, step: 0 });
    assert_eq!(f.step(), Some(0));
}

#[test]
fn found_after_intro_is_one_shot() {
    let mut f = fixture();
    f.found();
    f.found();
    assert_eq!(f.presentation.history().len(), 1);

    f.presentation.handle(Trigger::IntroElapsed);
    f.tick(5.0);
    let narration_cycles = f.presentation.narration().cycle();
    assert!(f.found().is_empty());
    assert_eq!(f.presentation.state(), PresentationState::Menu);
    assert_eq!(f.presentation.narration().cycle(), narration_cycles);
    assert!(f.tracking.intro_started());
}

#[test]
fn lost_silences_media_in_every_state() {
    let mut f = fixture_with(
        SimulatedBackend::new()
            .with_default_duration(Duration::from_seconds(2.0))
            .with_clip("BezVO.mp3", Duration::from_seconds(30.0)),
    );

    f.lost();
    assert_eq!(f.presentation.state(), PresentationState::Idle);

    f.found();
    f.tick(3.0);
    assert!(f.presentation.narration().position().as_seconds() > 2.9);
    f.lost();
    assert_eq!(f.presentation.state(), PresentationState::Intro);
    assert_eq!(f.presentation.narration().status(), PlaybackStatus::Paused);
    assert!(f.presentation.narration().position().is_zero());

    f.presentation.handle(Trigger::IntroElapsed);
    for action in [Action::OurContent, Action::AboutUs, Action::CaseStudies] {
        if f.presentation.state() != PresentationState::Menu {
            f.act(Action::Back);
        }
        f.act(action);
        let state = f.presentation.state();
        f.lost();
        assert_eq!(f.presentation.state(), state);
        assert_eq!(f.presentation.playing_count(), 0);
        assert!(f.presentation.narration().position().is_zero());
    }
}

#[test]
fn show_case_studies_reveals_only_cards() {
    let mut f = fixture();
    f.to_menu();
    f.act(Action::CaseStudies);
    assert_eq!(f.presentation.state(), PresentationState::CaseStudy);
    let entry = f.ids(Collection::CaseStudyButtons);
    let cards = f.ids(Collection::CaseStudyCards);
    assert!(entry.is_subset(&f.visible()));
    assert!(cards.is_disjoint(&f.visible()));
    assert!(f.ids(Collection::Avatar).is_disjoint(&f.visible()));

    let before = f.visible();
    f.act(Action::ShowCaseStudies);
    let after = f.visible();
    assert_eq!(f.presentation.state(), PresentationState::CaseStudy);
    let added: BTreeSet<_> = after.difference(&before).cloned().collect();
    assert_eq!(added, cards);
    assert!(before.is_subset(&after));
    assert!(entry.is_subset(&after));
}

#[test]
fn sequence_completion_is_idempotent() {
    let mut f = fixture();
    f.to_menu();
    f.act(Action::OurContent);
    f.tick(0.5);

    f.presentation.finish_sequence();
    let state = f.presentation.state();
    let visible = f.visible();
    let avatar = f.avatar_position();
    let transitions = f.presentation.history().len();

    f.presentation.finish_sequence();
    assert_eq!(f.presentation.state(), state);
    assert_eq!(f.visible(), visible);
    assert_eq!(f.avatar_position(), avatar);
    assert_eq!(f.presentation.history().len(), transitions);
    assert_eq!(f.presentation.playing_count(), 0);
}

#[test]
fn rejected_clip_is_skipped_after_timeout() {
    let mut f = fixture_with(
        SimulatedBackend::new()
            .with_default_duration(Duration::from_seconds(2.0))
            .rejecting("bez2.mp4"),
    );
    f.to_menu();
    f.act(Action::OurContent);
    while f.step() != Some(1) {
        f.tick(0.5);
    }
    f.tick(30.0);
    assert_eq!(f.step(), Some(1));
    assert_eq!(f.presentation.playing_count(), 0);

    let run = f.presentation.sequence().unwrap().run;
    let directives = f.presentation.handle(Trigger::StepTimedOut { run, step: 1 });
    assert_eq!(f.step(), Some(2));
    assert_eq!(f.playing_videos(), vec![2]);
    assert!(matches!(
        directives.as_slice(),
        [Directive::Wake {
            trigger: Trigger::StepTimedOut { step: 2, .. },
            ..
        }]
    ));
}

#[test]
fn back_cancels_sequence_and_late_notices_are_ignored() {
    let mut f = fixture();
    f.to_menu();
    f.act(Action::OurContent);
    let run = f.presentation.sequence().unwrap().run;
    f.act(Action::Back);
    assert_eq!(f.presentation.state(), PresentationState::Menu);
    assert_eq!(f.presentation.playing_count(), 0);
    assert!(f.presentation.sequence().is_none());

    f.presentation.handle(Trigger::StepFinished { run, step: 0 });
    assert_eq!(f.presentation.state(), PresentationState::Menu);
}

#[test]
fn link_actions_navigate() {
    let mut f = fixture();
    f.to_menu();
    assert_eq!(
        f.act(Action::OpenWebsite),
        vec![Directive::Navigate("https://www.bez.agency".into())]
    );
    assert_eq!(
        f.act(Action::OpenContact),
        vec![Directive::Navigate("mailto:bez@gmail.com".into())]
    );
    assert_eq!(f.presentation.state(), PresentationState::Menu);
}

#[test]
fn actions_outside_their_state_are_ignored() {
    let mut f = fixture();
    assert!(f.act(Action::OurContent).is_empty());
    assert_eq!(f.presentation.state(), PresentationState::Idle);

    f.to_menu();
    f.act(Action::ShowCaseStudies);
    f.act(Action::Back);
    assert_eq!(f.presentation.state(), PresentationState::Menu);
    assert!(!f.presentation.cards_revealed());

    f.act(Action::AboutUs);
    f.act(Action::CaseStudies);
    assert_eq!(f.presentation.state(), PresentationState::AboutUs);
}

#[test]
fn zero_length_clip_completes_without_waiting() {
    let mut f = fixture_with(
        SimulatedBackend::new()
            .with_default_duration(Duration::from_seconds(2.0))
            .with_clip("bez2.mp4", Duration::zero()),
    );
    f.to_menu();
    f.act(Action::OurContent);
    let mut seen = BTreeSet::new();
    while f.step() == Some(0) {
        f.tick(0.5);
        seen.extend(f.step());
    }
    // Step 1 finished as soon as it inspected its clip, within the same frame.
    assert_eq!(f.step(), Some(2));
    assert!(!seen.contains(&1));
    assert_eq!(f.playing_videos(), vec![2]);
}
