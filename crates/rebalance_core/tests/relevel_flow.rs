//! End-to-end releveling through the public engine API.

use data_runtime::{GrowthRules, RaceSpec, RaceTable, Settings, SkillBoost, StatRecalcMode};
use rebalance_core::{HostEvent, RebalanceEngine};
use world_core::{
    AttributeSet, CellId, CharacterTemplate, GrowthWeights, HostWorld, SKILL_COUNT, TemplateId,
    World, Zone, ZoneId,
};

fn engine(settings: Settings) -> RebalanceEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    RebalanceEngine::new(settings, GrowthRules::default(), RaceTable::default())
}

/// A world with one 10-30 zone covering cell 0 and one zoneless cell 1.
fn zoned_world() -> World {
    let world = World::new();
    world.add_zone(Zone::new(ZoneId(1), 10, 30));
    world.add_cell(CellId(0), Some(ZoneId(1)), true);
    world.add_cell(CellId(1), None, true);
    world
}

#[test]
fn zone_bounds_apply_with_the_player_multiplier() {
    let world = zoned_world();
    // 2x player level, authored range 1-100
    world.add_template(CharacterTemplate::new(TemplateId(1), 2000, 1, 100));
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((20, 60)));
}

#[test]
fn unloaded_cell_defers_processing() {
    let world = zoned_world();
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 1, 100));
    world.set_cell_loaded(CellId(0), false);
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((1, 100)));

    // the cell attaching retriggers and the relevel lands
    world.set_cell_loaded(CellId(0), true);
    eng.handle_event(&world, HostEvent::CellAttached(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((10, 30)));
}

#[test]
fn no_zone_with_skip_restores_the_previous_mutation() {
    let world = zoned_world();
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 5, 80));
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((10, 30)));

    // wandering out of every zone restores the original, not the defaults
    world.move_to_cell(inst, Some(CellId(1)));
    eng.handle_event(&world, HostEvent::MovedToAttachedCell(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((5, 80)));
}

#[test]
fn no_zone_defaults_apply_when_skip_is_disabled() {
    let world = zoned_world();
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 1, 100));
    let inst = world.spawn(TemplateId(1), Some(CellId(1)));

    let eng = engine(Settings {
        no_zone_skip: false,
        no_zone_min: 20,
        no_zone_max: 25,
        ..Settings::default()
    });
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((20, 25)));
}

#[test]
fn manual_uninstall_undoes_prior_mutation_and_suspends() {
    let world = zoned_world();
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 5, 80));
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings {
        manual_uninstall: true,
        ..Settings::default()
    });
    eng.on_data_init(&world);
    // a previous session (or another tool) left mutated bounds behind
    world.set_template_bounds(TemplateId(1), 10, 30);

    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((5, 80)));
    assert_eq!(eng.queued_stat_tasks(), 0);
}

#[test]
fn membership_change_restores_an_earlier_relevel() {
    let world = zoned_world();
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 5, 80));
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((10, 30)));

    // followers are excluded by default; recruiting must undo the relevel
    world.set_player_teammate(inst, true);
    eng.handle_event(&world, HostEvent::Initialized(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((5, 80)));
}

#[test]
fn summon_of_an_ineligible_owner_is_left_alone() {
    let world = zoned_world();
    let mut owner_tpl = CharacterTemplate::new(TemplateId(1), 1000, 1, 100);
    owner_tpl.is_unique = true;
    world.add_template(owner_tpl);
    let mut summon_tpl = CharacterTemplate::new(TemplateId(2), 1000, 1, 100);
    summon_tpl.is_summonable = true;
    world.add_template(summon_tpl);

    let owner = world.spawn(TemplateId(1), Some(CellId(0)));
    let summon = world.spawn(TemplateId(2), Some(CellId(0)));
    world.set_commanding_owner(summon, Some(owner));

    let eng = engine(Settings {
        relevel_uniques: false,
        ..Settings::default()
    });
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(summon));
    assert_eq!(world.template_bounds(TemplateId(2)), Some((1, 100)));

    // the owner itself is skipped too
    eng.handle_event(&world, HostEvent::Loaded(owner));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((1, 100)));
}

#[test]
fn origin_filter_excludes_by_data_source() {
    let world = zoned_world();
    let mut tpl = CharacterTemplate::new(TemplateId(1), 1000, 1, 100);
    tpl.origin_files = vec!["base.esm".into(), "patch.esp".into()];
    world.add_template(tpl);
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings {
        origin_filter_master: vec!["base.esm".into()],
        ..Settings::default()
    });
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((1, 100)));
    assert_eq!(eng.queued_stat_tasks(), 0);
}

#[test]
fn unscaled_templates_are_never_touched() {
    let world = zoned_world();
    let mut tpl = CharacterTemplate::new(TemplateId(1), 12, 12, 12);
    tpl.uses_player_scaling = false;
    world.add_template(tpl);
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(TemplateId(1)), Some((12, 12)));
}

#[test]
fn missing_template_is_skipped_silently() {
    let world = zoned_world();
    let inst = world.spawn(TemplateId(99), Some(CellId(0)));
    let eng = engine(Settings::default());
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(eng.queued_stat_tasks(), 0);
}

fn stat_world() -> (World, TemplateId) {
    let world = zoned_world();
    let mut tpl = CharacterTemplate::new(TemplateId(1), 2000, 1, 100);
    tpl.growth = Some(GrowthWeights {
        attributes: AttributeSet::new(3.0, 1.0, 2.0),
        skills: [1.0; SKILL_COUNT],
    });
    tpl.offsets = AttributeSet::new(50.0, 0.0, 0.0);
    tpl.race = Some("nord".into());
    world.add_template(tpl);
    (world, TemplateId(1))
}

fn races() -> RaceTable {
    let mut table = RaceTable::default();
    table.insert(RaceSpec {
        id: "nord".into(),
        base_health: 100.0,
        base_magicka: 50.0,
        base_stamina: 100.0,
        skill_boosts: vec![SkillBoost {
            skill: 7,
            value: 10.0,
        }],
    });
    table
}

#[test]
fn emulated_stat_pass_applies_and_then_smart_skips() {
    let (world, tpl) = stat_world();
    world.set_player_level(10);
    let inst = world.spawn(tpl, Some(CellId(0)));

    let eng = RebalanceEngine::new(
        Settings {
            stat_recalc: StatRecalcMode::Emulate,
            ..Settings::default()
        },
        GrowthRules::default(),
        races(),
    );
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    assert_eq!(world.template_bounds(tpl), Some((20, 60)));
    assert_eq!(eng.run_stat_tasks(&world), 1);

    let block = world.applied_stats(inst).expect("stats applied");
    // level 20 with weights 3/1/2: growth 190 ranks health, stamina,
    // magicka and splits 95/63/32; race base, offsets and the per-level
    // health bonus come on top
    assert_eq!(block.attributes.health, 95.0 + 50.0 + 100.0 + 5.0 * 19.0);
    assert_eq!(block.attributes.magicka, 32.0 + 50.0);
    assert_eq!(block.attributes.stamina, 63.0 + 100.0);
    assert!(block.skills.iter().all(|&s| s >= 15.0 && s <= 100.0));
    // racial boost on actor value 7 lands on skill 1
    assert!(block.skills[1] >= 25.0);

    // nothing changed since: the fast path skips the reapply
    eng.handle_event(&world, HostEvent::CellAttached(inst));
    assert_eq!(eng.run_stat_tasks(&world), 0);
    assert!(world.native_recalcs().is_empty());
}

#[test]
fn emulation_without_class_or_race_data_is_skipped() {
    let world = zoned_world();
    // template with neither growth weights nor race
    world.add_template(CharacterTemplate::new(TemplateId(1), 1000, 1, 100));
    let inst = world.spawn(TemplateId(1), Some(CellId(0)));

    let eng = RebalanceEngine::new(
        Settings {
            stat_recalc: StatRecalcMode::Emulate,
            ..Settings::default()
        },
        GrowthRules::default(),
        races(),
    );
    eng.on_data_init(&world);
    eng.handle_event(&world, HostEvent::Loaded(inst));
    // the relevel itself still happened
    assert_eq!(world.template_bounds(TemplateId(1)), Some((10, 30)));
    assert_eq!(eng.run_stat_tasks(&world), 0);
    assert!(world.applied_stats(inst).is_none());
}
