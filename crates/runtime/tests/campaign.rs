//! Campaign boundary: building contexts from persistent state and
//! reconciling results back into it.
mod common;

use std::collections::BTreeMap;

use game_core::{
    ActionCommand, BaselineEngine, BaselineEngineFactory, CardId, EncounterId, EncounterOutcome, EncounterResult,
    EncounterTransaction, EnemySnapshot, FateDeckState, VictoryKind,
};
use runtime::{
    Campaign, CampaignEvent, CampaignSink, CampaignState, CommitOutcome, EncounterCoordinator,
    EncounterPlan, Event, EventBus, HeroRecord, InitError, ReconcileError, ResultReconciler,
    RuntimeConfig, StaticContent, Topic,
};

use common::{cards, fate, rules, BLESSING, EMBER, SPARK};

const RELIC: CardId = CardId(9);

fn hero() -> HeroRecord {
    HeroRecord {
        name: "Ilse".to_string(),
        hp: 20,
        max_hp: 20,
        strength: 5,
        wisdom: 3,
        armor: 0,
        faith: 2,
        deck: vec![BLESSING, SPARK, EMBER],
    }
}

fn content() -> StaticContent {
    StaticContent {
        cards: cards(),
        fate_deck: FateDeckState::new(vec![fate(1, 1), fate(2, -1)]),
    }
}

fn plan() -> EncounterPlan {
    EncounterPlan::new(vec![
        EnemySnapshot::new(game_core::EnemyId(1), "shade", 8, 2, 0).with_loot(vec![RELIC]),
    ])
    .with_rules(rules())
}

fn result(encounter: EncounterId, transaction: EncounterTransaction) -> EncounterResult {
    EncounterResult {
        encounter,
        outcome: EncounterOutcome::Victory(VictoryKind::Killed),
        transaction,
        per_entity: BTreeMap::new(),
    }
}

#[test]
fn context_is_built_from_open_slot() {
    let mut state = CampaignState::new(hero(), 99);
    let content = content();
    assert!(state.encounter_context(&content).is_none());

    let id = state.begin_encounter(plan()).expect("no slot open");
    let context = state.encounter_context(&content).expect("slot open");

    assert_eq!(context.id, id);
    assert_eq!(context.hero.faith, 2);
    assert_eq!(context.hand, [BLESSING, SPARK, EMBER]);
    assert!(context.draw_pile.is_empty());
    assert_eq!(context.fate_deck, content.fate_deck);
    assert_eq!(context.cards.len(), 3);
    assert!(context.validate().is_ok());
}

#[test]
fn only_one_slot_may_be_open() {
    let mut state = CampaignState::new(hero(), 1);
    let first = state.begin_encounter(plan()).expect("no slot open");

    assert_eq!(
        state.begin_encounter(plan()),
        Err(ReconcileError::EncounterInProgress(first))
    );
}

#[test]
fn coordinator_needs_an_open_slot() {
    let mut campaign = Campaign::new(CampaignState::new(hero(), 1), content());
    let result = EncounterCoordinator::from_campaign(
        &mut campaign,
        &BaselineEngineFactory,
        RuntimeConfig::default(),
    );
    assert!(matches!(result, Err(InitError::NoActiveEncounter)));
}

#[test]
fn full_encounter_commits_exactly_once() {
    let bus = EventBus::new();
    let mut campaign_events = bus.subscribe(Topic::Campaign);
    let mut campaign =
        Campaign::new(CampaignState::new(hero(), 5), content()).with_event_bus(bus.clone());
    let id = campaign.begin_encounter(plan()).expect("no slot open");

    let mut coordinator = EncounterCoordinator::<BaselineEngine>::builder()
        .event_bus(bus.clone())
        .build_from_campaign(&mut campaign, &BaselineEngineFactory)
        .expect("slot is playable");
    coordinator.start().expect("encounter starts");

    for _ in 0..10 {
        if coordinator.is_finished() {
            break;
        }
        let target = coordinator
            .view()
            .active_enemies()
            .next()
            .map(|enemy| enemy.id)
            .expect("an enemy remains while unfinished");
        coordinator
            .submit(ActionCommand::Attack { target })
            .expect("protocol holds");
    }
    assert!(coordinator.is_finished());

    let result = coordinator.take_result().expect("result available once");
    assert_eq!(result.encounter, id);
    assert_eq!(result.outcome, EncounterOutcome::Victory(VictoryKind::Killed));

    let first = campaign
        .apply_encounter_result(&result)
        .expect("slot matches");
    let CommitOutcome::Committed(summary) = first else {
        panic!("first commit must apply, got {first:?}");
    };
    assert_eq!(summary.loot_added, 1);
    assert_eq!(campaign.state.hero.deck.last(), Some(&RELIC));
    assert_eq!(campaign.state.world_flags.get("slain:shade"), Some(&true));
    assert!(campaign.state.open_encounter().is_none());
    assert_eq!(campaign.state.hero.hp, summary.hp_after);

    let snapshot = campaign.state.clone();
    assert_eq!(
        campaign.apply_encounter_result(&result),
        Ok(CommitOutcome::AlreadyApplied)
    );
    assert_eq!(campaign.state, snapshot);

    let events: Vec<Event> = common::drain(&mut campaign_events);
    assert!(matches!(
        events.as_slice(),
        [
            Event::Campaign(CampaignEvent::EncounterOpened { .. }),
            Event::Campaign(CampaignEvent::ResultCommitted { .. }),
            Event::Campaign(CampaignEvent::DuplicateIgnored { .. }),
        ]
    ));
}

#[test]
fn reconciler_clamps_hp_and_ignores_faith_loss() {
    let content = content();
    let reconciler = ResultReconciler::new(&content);
    let mut state = CampaignState::new(hero(), 1);
    let id = state.begin_encounter(plan()).expect("no slot open");

    let transaction = EncounterTransaction {
        hp_delta: -100,
        faith_delta: -2,
        resonance_delta: -1.0,
        ..EncounterTransaction::default()
    };
    let outcome = reconciler
        .apply(&mut state, &result(id, transaction))
        .expect("slot matches");

    assert!(matches!(outcome, CommitOutcome::Committed(_)));
    assert_eq!(state.hero.hp, 0);
    assert_eq!(state.hero.faith, 2);
    assert_eq!(state.world_resonance, -1.0);
    assert_eq!(state.fate_deck.as_ref(), Some(&content.fate_deck));
    assert_eq!(state.history, [(id, EncounterOutcome::Victory(VictoryKind::Killed))]);
}

#[test]
fn reconciler_applies_gains_and_replaces_fate_deck() {
    let content = content();
    let reconciler = ResultReconciler::new(&content);
    let mut state = CampaignState::new(hero(), 1);
    state.hero.hp = 10;
    state
        .world_flags
        .insert("gate_opened".to_string(), false);
    let id = state.begin_encounter(plan()).expect("no slot open");

    let carried = FateDeckState::new(vec![fate(7, 3)]);
    let transaction = EncounterTransaction {
        hp_delta: 25,
        faith_delta: 3,
        world_flags: BTreeMap::from([("gate_opened".to_string(), true)]),
        loot_cards: vec![RELIC, RELIC],
        updated_fate_deck: Some(carried.clone()),
        ..EncounterTransaction::default()
    };
    reconciler
        .apply(&mut state, &result(id, transaction))
        .expect("slot matches");

    assert_eq!(state.hero.hp, 20);
    assert_eq!(state.hero.faith, 5);
    assert_eq!(state.hero.deck, [BLESSING, SPARK, EMBER, RELIC, RELIC]);
    assert_eq!(state.world_flags.get("gate_opened"), Some(&true));
    assert_eq!(state.fate_deck, Some(carried));
}

#[test]
fn reconciler_refuses_foreign_results() {
    let content = content();
    let reconciler = ResultReconciler::new(&content);
    let mut state = CampaignState::new(hero(), 1);

    assert_eq!(
        reconciler.apply(&mut state, &result(EncounterId(3), EncounterTransaction::default())),
        Err(ReconcileError::NoOpenEncounter)
    );

    let open = state.begin_encounter(plan()).expect("no slot open");
    let before = state.clone();
    assert_eq!(
        reconciler.apply(&mut state, &result(EncounterId(3), EncounterTransaction::default())),
        Err(ReconcileError::SlotMismatch {
            expected: open,
            received: EncounterId(3),
        })
    );
    assert_eq!(state, before);
}

#[test]
fn abandoned_encounter_frees_the_slot_and_refuses_late_results() {
    let bus = EventBus::new();
    let mut campaign_events = bus.subscribe(Topic::Campaign);
    let mut campaign =
        Campaign::new(CampaignState::new(hero(), 5), content()).with_event_bus(bus.clone());
    let first = campaign.begin_encounter(plan()).expect("no slot open");

    assert_eq!(
        campaign.abandon_encounter(EncounterId(42)),
        Err(ReconcileError::SlotMismatch {
            expected: first,
            received: EncounterId(42),
        })
    );

    let before = campaign.state.hero.clone();
    campaign.abandon_encounter(first).expect("slot matches");
    assert!(campaign.state.open_encounter().is_none());
    assert!(campaign.state.is_abandoned(first));
    assert!(!campaign.state.is_applied(first));
    assert_eq!(campaign.state.hero, before);
    assert!(campaign.state.history.is_empty());
    assert_eq!(
        campaign.abandon_encounter(first),
        Err(ReconcileError::NoOpenEncounter)
    );

    let second = campaign.begin_encounter(plan()).expect("slot was freed");
    assert_ne!(second, first);
    assert_eq!(
        campaign.apply_encounter_result(&result(first, EncounterTransaction::default())),
        Err(ReconcileError::Abandoned(first))
    );
    assert_eq!(campaign.state.open_encounter().map(|slot| slot.id), Some(second));

    let events: Vec<Event> = common::drain(&mut campaign_events);
    assert!(matches!(
        events.as_slice(),
        [
            Event::Campaign(CampaignEvent::EncounterOpened { .. }),
            Event::Campaign(CampaignEvent::EncounterAbandoned { .. }),
            Event::Campaign(CampaignEvent::EncounterOpened { .. }),
        ]
    ));
}
