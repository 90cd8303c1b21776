use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use cleanair::app::{App, AppState, Flow};
use cleanair::config::{Config, GameMode};
use cleanair::game::Game;
use cleanair::matcher::KeyOutcome;
use cleanair::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use cleanair::session::{Outcome, SessionStatus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const STEP: Duration = Duration::from_millis(10);

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Drives the app shell through the runtime Runner without a TTY
#[test]
fn headless_menu_to_game_over_flow() {
    let mut app = App::new(Game::with_seed(Config::default(), 3));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    for event in [key('t'), key('1'), key('2'), key('3')] {
        tx.send(event).unwrap();
    }

    let mut seen_game_over = false;
    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick(runner.tick_interval());
                if app.state == AppState::GameOver && !seen_game_over {
                    seen_game_over = true;
                    tx.send(key('q')).unwrap();
                }
            }
            AppEvent::Resize => {}
            AppEvent::Key(k) => {
                if app.on_key(k) == Flow::Quit {
                    break;
                }
            }
        }
    }

    assert!(seen_game_over, "three wrong keys should end the round");
    assert_eq!(app.game.session().outcome(), Some(Outcome::Defeat));
    assert_eq!(app.game.session().wrong_keys, 3);
}

#[test]
fn timed_round_without_presses_ends_in_defeat() {
    let mut game = Game::with_seed(Config::default(), 21);
    game.start(GameMode::Timed);

    let mut steps = 0;
    while game.is_running() && steps < 6_000 {
        game.on_tick(STEP);
        steps += 1;
    }

    let session = game.session();
    assert_eq!(session.status, SessionStatus::Finished(Outcome::Defeat));
    assert_eq!(session.lives, 0);
    assert_eq!(session.score, 0);
    assert_eq!(session.score as usize, session.hits());
    assert_eq!(session.misses, 3);
    assert!(game.items().is_empty());
    assert_eq!(game.pending_timers(), 0);
}

#[test]
fn timed_round_ends_with_hits_scored_before_defeat() {
    let mut game = Game::with_seed(Config::default(), 8);
    game.start(GameMode::Timed);

    // clear the first two clouds, then let everything else escape
    let mut cleared = 0;
    let mut steps = 0;
    while game.is_running() && steps < 6_000 {
        game.on_tick(STEP);
        if cleared < 2 {
            let target = game.items().iter().find(|it| it.is_rising()).map(|it| it.key);
            if let Some(k) = target {
                assert_matches!(game.on_key(k), KeyOutcome::Hit { .. });
                cleared += 1;
            }
        }
        steps += 1;
    }

    assert_eq!(game.session().outcome(), Some(Outcome::Defeat));
    assert_eq!(game.session().score, 2);
    assert_eq!(game.session().hits(), 2);
}

#[test]
fn infinite_perfect_play_recharges_lives() {
    let config = Config::default();
    let mut game = Game::with_seed(config.clone(), 99);
    game.start(GameMode::Infinite);

    let mut last_lives = game.session().lives;
    for _ in 0..3_000 {
        game.on_tick(STEP);
        let targets: Vec<char> = game
            .items()
            .iter()
            .filter(|it| it.is_rising())
            .map(|it| it.key)
            .collect();
        for k in targets {
            assert_matches!(game.on_key(k), KeyOutcome::Hit { .. });

            let session = game.session();
            let expected = (config.start_lives_infinite + session.score / config.life_charge_required)
                .min(config.max_lives);
            assert_eq!(session.lives, expected);
            assert!(session.lives >= last_lives);
            last_lives = session.lives;
        }
        assert_eq!(game.session().score, game.session().generation_count);
    }

    let session = game.session();
    assert!(game.is_running());
    assert_eq!(session.misses, 0);
    assert_eq!(session.wrong_keys, 0);
    assert_eq!(session.lives, config.max_lives);
    assert!(session.score >= 30);
    assert!(session.difficulty_level > 0);
}

#[test]
fn random_play_keeps_invariants() {
    let config = Config {
        penalty: cleanair::config::PenaltyKind::Life,
        ..Config::default()
    };
    let mut presses = StdRng::seed_from_u64(1234);
    let mut noise = config.keys.clone();
    noise.extend(['1', 'p', 'M', ' ']);

    for seed in 0..5u64 {
        let mut game = Game::with_seed(config.clone(), seed);
        game.start(GameMode::Infinite);

        while game.is_running() {
            game.on_tick(Duration::from_millis(presses.gen_range(1..60)));

            if presses.gen_bool(0.5) {
                let score = game.session().score;
                let pressed = *noise.choose(&mut presses).unwrap();
                match game.on_key(pressed) {
                    KeyOutcome::Hit { .. } => assert_eq!(game.session().score, score + 1),
                    _ => assert_eq!(game.session().score, score),
                }
            }

            let items = game.items();
            assert!(items.len() <= config.max_items_on_screen);
            for (i, a) in items.iter().enumerate() {
                assert!(items[i + 1..].iter().all(|b| b.key != a.key));
            }
            assert!(game.session().lives <= config.max_lives);
        }

        assert_eq!(game.session().outcome(), Some(Outcome::Defeat));
        assert_eq!(game.session().lives, 0);
    }
}

#[test]
fn return_to_menu_twice_matches_once() {
    let mut game = Game::with_seed(Config::default(), 5);
    game.start(GameMode::Timed);
    for _ in 0..150 {
        game.on_tick(STEP);
    }
    game.on_key('1');

    game.return_to_menu();
    let once = game.session().clone();
    let timers = game.pending_timers();

    game.return_to_menu();
    assert_eq!(*game.session(), once);
    assert_eq!(game.pending_timers(), timers);
    assert_eq!(timers, 0);
    assert!(game.items().is_empty());
    assert!(!game.is_running());

    // a stale clock never reaches the idle session
    game.on_tick(Duration::from_secs(5));
    assert_eq!(*game.session(), once);
}
