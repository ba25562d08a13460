use std::cell::RefCell;

use gnw::{
    BattleError, Catalogue, CombatContext, CombatResolver, Forecast, GeoCalculator, LatLng, Order,
    Orders, Pace, Propulsion, Rules, SailRig, Ship, ShipState, TurnOutcome, TurnResolver,
    TurnSnapshot, Wind,
};
use rand::{rngs::SmallRng, SeedableRng};

const SITE: LatLng = LatLng::new(37.95, 23.57);

fn trireme(id: &str, heading: u16, pace: Pace) -> Ship {
    let cat = Catalogue::standard();
    let def = cat.require("Trireme").unwrap();
    let mut ship = Ship::build(id, "Paralos", def, "Athens");
    ship.state = ShipState::Ready;
    ship.battle_id = Some("b1".into());
    ship.location = Some(SITE);
    ship.heading = heading;
    ship.propulsion = Propulsion::Rowing { pace };
    ship
}

fn orders(list: &[Order]) -> Option<Orders> {
    let mut o = [Order::Wait; 5];
    o[..list.len()].copy_from_slice(list);
    Some(o)
}

fn breeze() -> Wind {
    Wind::new(2, 0, Forecast::Steady)
}

fn run(ships: Vec<Ship>, wind: Wind, seed: u64) -> TurnOutcome {
    let cat = Catalogue::standard();
    let rules = Rules::default();
    let snapshot = TurnSnapshot {
        battle_id: "b1".into(),
        turn: 0,
        wind,
        site: SITE,
        ships,
    };
    let mut rng = SmallRng::seed_from_u64(seed);
    TurnResolver::new(&cat, &rules)
        .resolve(&snapshot, &mut rng)
        .unwrap()
}

fn moved(ship: &Ship) -> f64 {
    GeoCalculator::new(SITE.lat).distance(SITE, ship.location.unwrap())
}

#[test]
fn cruising_ship_moves_five_sub_phases() {
    let ship = trireme("s1", 0, Pace::Cruise);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.turn, 1);
    let ship = &out.ships[0];
    assert!((moved(ship) - 185.0).abs() < 0.01);
    assert!(ship.location.unwrap().lat > SITE.lat);
    assert_eq!(out.crumbs.len(), 5);
    assert!(out.crumbs.iter().all(|(id, c)| id == "s1" && c.turn == 0));
    assert_eq!(out.crumbs[0].1.location, SITE);
    assert!(ship.orders.is_none());
}

#[test]
fn steering_delay_blocks_next_two_sub_phases() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.orders = orders(&[Order::Port, Order::Starboard, Order::Starboard]);
    let out = run(vec![ship], breeze(), 1);
    // port accepted, both starboard orders ignored
    assert_eq!(out.ships[0].heading, 315);
    assert_eq!(out.ships[0].delay_countdown, -1);
}

#[test]
fn steering_allowed_again_after_delay() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.orders = orders(&[Order::Port, Order::Wait, Order::Wait, Order::Starboard]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].heading, 0);
    assert_eq!(out.ships[0].delay_countdown, 2);
}

#[test]
fn stationary_ship_cannot_steer() {
    let mut ship = trireme("s1", 90, Pace::Stop);
    ship.orders = orders(&[Order::Port, Order::Port]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].heading, 90);
    assert_eq!(out.ships[0].location, Some(SITE));
    assert!(out.crumbs.is_empty());
}

#[test]
fn helm_is_reversed_going_astern() {
    let mut ship = trireme("s1", 0, Pace::Back);
    ship.orders = orders(&[Order::Port]);
    let out = run(vec![ship], breeze(), 1);
    let ship = &out.ships[0];
    assert_eq!(ship.heading, 45);
    // slow turn delay of one, plus one, less four further moves
    assert_eq!(ship.delay_countdown, -2);
    assert!(ship.location.unwrap().lat < SITE.lat);
}

#[test]
fn pace_change_waits_for_next_turn() {
    let mut ship = trireme("s1", 0, Pace::Stop);
    ship.orders = orders(&[Order::Faster, Order::Faster, Order::Faster]);
    let out = run(vec![ship], breeze(), 1);
    let ship = out.ships[0].clone();
    // one step only, and the ship stays where it was this turn
    assert_eq!(ship.propulsion, Propulsion::Rowing { pace: Pace::Slow });
    assert_eq!(ship.location, Some(SITE));
    assert!(out.crumbs.is_empty());

    let out = run(vec![ship], breeze(), 2);
    assert!((moved(&out.ships[0]) - 60.0).abs() < 0.01);
    assert_eq!(out.crumbs.len(), 5);
}

#[test]
fn turn_delay_follows_turn_start_speed() {
    // easing off on the first order still steers on the cruising delay
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.orders = orders(&[Order::Slower, Order::Port]);
    let out = run(vec![ship], breeze(), 1);
    let ship = &out.ships[0];
    assert_eq!(ship.heading, 315);
    assert_eq!(ship.propulsion, Propulsion::Rowing { pace: Pace::Slow });
    // delay of two, plus one, less three further moves
    assert_eq!(ship.delay_countdown, 0);
    assert_eq!(out.crumbs.len(), 5);
}

#[test]
fn full_speed_needs_fresh_rowers() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.health.full_speeds = 0;
    ship.orders = orders(&[Order::Faster]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Cruise });

    let mut ship = trireme("s2", 0, Pace::Cruise);
    ship.orders = orders(&[Order::Faster]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Full });
    assert_eq!(out.ships[0].health.full_speeds, 3);
}

#[test]
fn rowers_tire_at_full_speed() {
    let mut ship = trireme("s1", 0, Pace::Full);
    ship.health.full_speeds = 1;
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].health.full_speeds, 0);
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Cruise });
    assert!(out.log.iter().any(|e| e.event == "rowers exhausted" && e.turn == 1));
}

#[test]
fn no_rowing_in_fresh_breeze() {
    let ship = trireme("s1", 0, Pace::Cruise);
    let out = run(vec![ship], Wind::new(5, 0, Forecast::Steady), 1);
    assert_eq!(out.ships[0].location, Some(SITE));
    assert!(out.crumbs.is_empty());
}

#[test]
fn empty_oar_bank_stops_rowing() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.health.starboard.oars = 0;
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].location, Some(SITE));
}

#[test]
fn crippled_ship_uses_crippled_table_and_wind_limit() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.state = ShipState::Crippled;
    let out = run(vec![ship.clone()], breeze(), 1);
    assert!((moved(&out.ships[0]) - 125.0).abs() < 0.01);

    // limited to slow from a gentle breeze upwards
    let out = run(vec![ship], Wind::new(3, 0, Forecast::Steady), 1);
    assert!((moved(&out.ships[0]) - 60.0).abs() < 0.01);
}

#[test]
fn sailing_needs_a_rudder_or_both_banks_to_steer() {
    // wind from the south, heading north: running before it
    let wind = Wind::new(3, 4, Forecast::Steady);
    let mut ship = trireme("s1", 0, Pace::Stop);
    ship.propulsion = Propulsion::Sailing { rig: SailRig::Full };
    ship.health.port.oars = 0;
    ship.health.port.rudder = false;
    ship.health.starboard.rudder = false;
    ship.orders = orders(&[Order::Port]);
    let out = run(vec![ship.clone()], wind, 1);
    assert_eq!(out.ships[0].heading, 0);
    assert!((moved(&out.ships[0]) - 370.0).abs() < 0.01);

    ship.health.starboard.rudder = true;
    let out = run(vec![ship], wind, 1);
    assert_eq!(out.ships[0].heading, 315);
}

#[test]
fn sail_handling() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.orders = orders(&[Order::RaiseSail, Order::LowerSail]);
    let out = run(vec![ship], breeze(), 1);
    // second sail order in the same turn is ignored
    assert_eq!(out.ships[0].propulsion, Propulsion::Sailing { rig: SailRig::Full });

    let mut ship = out.ships[0].clone();
    ship.orders = orders(&[Order::Slower]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].propulsion, Propulsion::Sailing { rig: SailRig::Reefed });

    let mut ship = out.ships[0].clone();
    ship.orders = orders(&[Order::LowerSail]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Stop });
}

#[test]
fn cannot_raise_sail_without_mast() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.health.rigging.mast = false;
    ship.orders = orders(&[Order::RaiseSail]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Cruise });
}

#[test]
fn transfer_refills_empty_bank_once() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.health.port.oars = 0;
    ship.orders = orders(&[Order::Transfer, Order::Transfer]);
    let out = run(vec![ship], breeze(), 1);
    let health = &out.ships[0].health;
    assert_eq!((health.port.oars, health.starboard.oars), (1, 3));
    assert_eq!(out.ships[0].propulsion, Propulsion::Rowing { pace: Pace::Stop });
    assert_eq!(out.log.iter().filter(|e| e.event == "oars transferred").count(), 1);
}

#[test]
fn transfer_ignored_with_both_banks_manned() {
    let mut ship = trireme("s1", 0, Pace::Stop);
    ship.orders = orders(&[Order::Transfer]);
    let out = run(vec![ship], breeze(), 1);
    let health = &out.ships[0].health;
    assert_eq!((health.port.oars, health.starboard.oars), (4, 4));
}

#[test]
fn transfer_needs_ship_stationary_from_turn_start() {
    let mut ship = trireme("s1", 0, Pace::Slow);
    ship.health.port.oars = 0;
    ship.propulsion = Propulsion::Sailing { rig: SailRig::Full };
    // lowering sail mid-turn does not make a moving ship stationary
    ship.orders = orders(&[Order::LowerSail, Order::Transfer]);
    let wind = Wind::new(3, 4, Forecast::Steady);
    let out = run(vec![ship], wind, 1);
    let health = &out.ships[0].health;
    assert_eq!((health.port.oars, health.starboard.oars), (0, 4));
    assert!(moved(&out.ships[0]) > 0.0);
}

#[test]
fn one_plug_attempt_per_turn() {
    for seed in 0..200 {
        let mut ship = trireme("s1", 0, Pace::Stop);
        ship.health.hull = 4;
        ship.health.holes = 3;
        let out = run(vec![ship], breeze(), seed);
        let health = &out.ships[0].health;
        let attempts = out
            .log
            .iter()
            .filter(|e| e.event == "hole plugged" || e.event == "plug failed")
            .count();
        assert_eq!(attempts, 1, "seed {}", seed);
        assert!(
            (health.holes == 2 && health.hull == 4) || (health.holes == 3 && health.hull == 3),
            "seed {}: {:?}",
            seed,
            health
        );
    }
}

#[test]
fn low_hull_cripples() {
    let mut ship = trireme("s1", 0, Pace::Stop);
    ship.health.hull = 2;
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].state, ShipState::Crippled);
    assert!(out.log.iter().any(|e| e.event == "crippled"));
}

#[test]
fn wrecked_hull_sinks_once() {
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.health.hull = 0;
    let out = run(vec![ship], breeze(), 3);
    let ship = out.ships[0].clone();
    assert!(ship.health.sunk);
    assert_eq!(ship.state, ShipState::Sunk);
    assert_eq!(out.sunk, vec!["s1".to_string()]);
    assert_eq!(out.log.iter().filter(|e| e.event == "SUNK!").count(), 1);

    let again = run(vec![ship], breeze(), 4);
    assert!(again.sunk.is_empty());
    assert_eq!(again.log.iter().filter(|e| e.event == "SUNK!").count(), 0);
}

#[test]
fn sunk_ship_ignores_steering_but_survivors_swim() {
    let mut ship = trireme("s1", 0, Pace::Stop);
    ship.health.sunk = true;
    ship.state = ShipState::Sunk;
    ship.orders = orders(&[Order::Port, Order::Swim, Order::Swim]);
    let out = run(vec![ship], breeze(), 1);
    assert_eq!(out.ships[0].heading, 0);
    assert!((moved(&out.ships[0]) - 10.0).abs() < 0.01);
}

#[test]
fn orders_validated_against_sunk_state() {
    let mut ship = trireme("s1", 0, Pace::Stop);
    let steer = [Order::Port, Order::Wait, Order::Wait, Order::Wait, Order::Wait];
    let swim = [Order::Swim, Order::Wait, Order::Wait, Order::Wait, Order::Wait];
    assert!(ship.validate_orders(&steer).is_ok());
    assert!(matches!(ship.validate_orders(&swim), Err(BattleError::InvalidOrder(_))));
    ship.health.sunk = true;
    assert!(matches!(ship.validate_orders(&steer), Err(BattleError::InvalidOrder(_))));
    assert!(ship.validate_orders(&swim).is_ok());
}

#[test]
fn missing_location_rejected() {
    let cat = Catalogue::standard();
    let rules = Rules::default();
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.location = None;
    let snapshot = TurnSnapshot {
        battle_id: "b1".into(),
        turn: 0,
        wind: breeze(),
        site: SITE,
        ships: vec![ship],
    };
    let mut rng = SmallRng::seed_from_u64(1);
    let err = TurnResolver::new(&cat, &rules)
        .resolve(&snapshot, &mut rng)
        .unwrap_err();
    assert_eq!(err, BattleError::MissingLocation("s1".into()));
}

#[test]
fn unknown_ship_type_rejected() {
    let cat = Catalogue::standard();
    let rules = Rules::default();
    let mut ship = trireme("s1", 0, Pace::Cruise);
    ship.ship_type = "Galleon".into();
    let snapshot = TurnSnapshot {
        battle_id: "b1".into(),
        turn: 0,
        wind: breeze(),
        site: SITE,
        ships: vec![ship],
    };
    let mut rng = SmallRng::seed_from_u64(1);
    let err = TurnResolver::new(&cat, &rules)
        .resolve(&snapshot, &mut rng)
        .unwrap_err();
    assert_eq!(err, BattleError::UnknownShipType("Galleon".into()));
}

#[derive(Default)]
struct Recorder {
    phases: RefCell<Vec<&'static str>>,
}

impl CombatResolver for Recorder {
    fn archery(&self, _ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("archery");
    }
    fn raking(&self, _ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("raking");
    }
    fn ramming(&self, ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("ramming");
        for ship in ctx.ships.iter_mut() {
            ship.health.holes += 1;
        }
    }
    fn grappling(&self, _ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("grappling");
    }
    fn boarding(&self, _ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("boarding");
    }
    fn morale(&self, _ctx: &mut CombatContext<'_>) {
        self.phases.borrow_mut().push("morale");
    }
}

#[test]
fn combat_phases_run_in_order_before_rollover() {
    let cat = Catalogue::standard();
    let rules = Rules::default();
    let recorder = Recorder::default();
    let snapshot = TurnSnapshot {
        battle_id: "b1".into(),
        turn: 0,
        wind: breeze(),
        site: SITE,
        ships: vec![trireme("s1", 0, Pace::Stop)],
    };
    let mut rng = SmallRng::seed_from_u64(9);
    let out = TurnResolver::with_combat(&cat, &rules, &recorder)
        .resolve(&snapshot, &mut rng)
        .unwrap();
    assert_eq!(
        *recorder.phases.borrow(),
        vec!["archery", "raking", "ramming", "grappling", "boarding", "morale"]
    );
    // the hole from ramming was either plugged or cost a point of hull
    let health = &out.ships[0].health;
    assert!(
        (health.holes == 0 && health.hull == 4) || (health.holes == 1 && health.hull == 3),
        "{:?}",
        health
    );
    assert_eq!(out.log.len(), 1);
}
