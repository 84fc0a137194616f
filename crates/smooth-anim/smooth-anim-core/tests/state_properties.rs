use std::collections::BTreeSet;

use smooth_anim::{
    ActionError, ActionParams, AnimationController, AnimationEntry, AnimationRegistry,
    AttributeStore, ItemStack, NoPresentation, PresentationState, ProviderRegistry,
    RecordingSink, Severity, SmoothAnimationConfig,
};

struct Nobody;

const IDS: [&str; 4] = ["draw", "aim", "release", "reload"];

fn config() -> SmoothAnimationConfig {
    SmoothAnimationConfig {
        animations: IDS
            .iter()
            .map(|id| AnimationEntry::new(*id, format!("bow-{id}")))
            .collect(),
        ..Default::default()
    }
}

fn controller() -> AnimationController<Nobody> {
    AnimationController::new("bowanim", &config(), &ProviderRegistry::new(), NoPresentation)
        .expect("controller")
}

/// Small deterministic generator so sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn snapshot_matches_last_write_per_identifier() {
    for seed in 1..=20u64 {
        let mut rng = Lcg(seed);
        let mut ctl = controller();
        let mut bow = ItemStack::new("bow");
        let mut expected = BTreeSet::new();

        for _ in 0..64 {
            let id = IDS[(rng.next() % IDS.len() as u64) as usize];
            if rng.next() % 2 == 0 {
                assert!(ctl.process(&mut bow, &Nobody, &ActionParams::start(id)));
                expected.insert(id.to_string());
            } else {
                assert!(ctl.process(&mut bow, &Nobody, &ActionParams::stop(id)));
                expected.remove(id);
            }
        }

        let got: BTreeSet<String> = ctl.snapshot_active_identifiers(&bow).into_iter().collect();
        assert_eq!(got, expected, "seed {seed}");
    }
}

#[test]
fn start_is_idempotent() {
    let mut once = ItemStack::new("bow");
    let mut twice = ItemStack::new("bow");
    let mut ctl = controller();

    ctl.process(&mut once, &Nobody, &ActionParams::start("aim"));
    ctl.process(&mut twice, &Nobody, &ActionParams::start("aim"));
    ctl.process(&mut twice, &Nobody, &ActionParams::start("aim"));

    let key = ctl.active_set().attribute().to_string();
    assert_eq!(once.get_bool_array(&key), twice.get_bool_array(&key));
    assert_eq!(
        twice.get_bool_array(&key),
        Some(vec![false, true, false, false])
    );
}

#[test]
fn fresh_item_is_all_inactive() {
    let ctl = controller();
    let bow = ItemStack::new("bow");
    let read = ctl.active_set().load(&bow);
    assert_eq!(read.bits, vec![false; IDS.len()]);
    assert!(ctl.snapshot_active_identifiers(&bow).is_empty());
    for id in IDS {
        assert!(!ctl.is_active(&bow, id));
    }
}

#[test]
fn registry_is_stable_across_builds() {
    let cfg = config();
    let first = AnimationRegistry::from_entries(&cfg.animations).unwrap();
    for _ in 0..5 {
        let again = AnimationRegistry::from_entries(&cfg.animations).unwrap();
        for id in IDS {
            assert_eq!(first.index_of(id), again.index_of(id));
        }
    }
}

#[test]
fn disabled_system_passes_valid_actions_through() {
    let mut ctl: AnimationController<Nobody, PresentationState> =
        AnimationController::disabled("bowanim", PresentationState::new());
    let mut bow = ItemStack::new("bow");
    assert!(!ctl.is_enabled());

    for params in [
        ActionParams::start("draw"),
        ActionParams::stop("draw"),
        ActionParams::start("not-configured"),
        ActionParams::clear(),
        ActionParams::last(),
    ] {
        assert!(ctl.process(&mut bow, &Nobody, &params), "{params:?}");
    }
    assert!(bow.attributes.is_empty());
    assert!(!bow.is_dirty());
    assert!(ctl.presentation().playing().is_empty());
    assert!(ctl.presentation().attachments().is_empty());

    assert!(!ctl.process(&mut bow, &Nobody, &ActionParams::new("teleport")));
}

#[test]
fn unknown_action_is_rejected_without_mutation() {
    let sink = RecordingSink::new();
    let mut ctl = controller().with_diagnostics(sink.clone());
    let mut bow = ItemStack::new("bow");
    ctl.process(&mut bow, &Nobody, &ActionParams::start("draw"));
    bow.take_dirty();
    let before = bow.clone();

    assert!(!ctl.process(
        &mut bow,
        &Nobody,
        &ActionParams::new("teleport").with_code("draw")
    ));
    assert_eq!(bow, before);
    assert!(!bow.is_dirty());
    assert_eq!(sink.count(Severity::Error), 1);

    let err = ctl
        .try_process(&mut bow, &Nobody, &ActionParams::new("teleport"))
        .unwrap_err();
    assert_eq!(
        err,
        ActionError::UnknownAction {
            action: "teleport".into()
        }
    );
}

#[test]
fn start_without_code_fails() {
    let mut ctl = controller();
    let mut bow = ItemStack::new("bow");
    assert!(!ctl.process(&mut bow, &Nobody, &ActionParams::new("start")));
    assert!(!ctl.process(&mut bow, &Nobody, &ActionParams::start("  ")));
    assert!(bow.attributes.is_empty());
}
