use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;

use blast_board::adapter::{
    parse_request, spawn_session, Command, Emitted, Request, SessionConfig, SessionEvent,
};
use blast_board::core::{BoardConfig, DirLevelSource};

fn is_cube(code: &str) -> bool {
    matches!(code, "r" | "g" | "b" | "y")
}

fn config() -> SessionConfig {
    SessionConfig {
        tick_ms: 2,
        levels_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels"),
        level: 1,
        animation_ms: 5,
    }
}

/// Complete animations after `animation_ms` until `stop` matches.
async fn drain_until(
    events: &mut mpsc::UnboundedReceiver<Emitted>,
    animation: Duration,
    stop: impl Fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    let wait = async {
        while let Some(mut emitted) = events.recv().await {
            emitted.complete_after(animation);
            let done = stop(&emitted.event);
            seen.push(emitted.event);
            if done {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("timed out waiting for session");
    seen
}

#[tokio::test]
async fn session_plays_a_blast_from_json_lines() {
    let config = config();
    let animation = Duration::from_millis(config.animation_ms);
    let source = DirLevelSource::new(&config.levels_dir);
    let mut session = spawn_session(config, BoardConfig::default().with_seed(3), source);

    // Find a blastable cell from an observation.
    session
        .commands
        .send(parse_request(r#"{"type":"observe","seq":1}"#).unwrap())
        .await
        .unwrap();
    let seen = drain_until(&mut session.events, animation, |e| {
        matches!(e, SessionEvent::Observation { .. })
    })
    .await;
    let Some(SessionEvent::Observation { board }) = seen.last() else {
        panic!("expected observation");
    };
    assert_eq!(board.level, Some(1));
    assert_eq!(board.state, "ready");
    assert_eq!((board.width, board.height), (6, 6));
    assert!(board.goals.iter().any(|g| g.kind == "bo" && g.remaining == 6));

    let target = board
        .cells
        .iter()
        .find(|c| {
            [(1i8, 0i8), (0, 1)].iter().any(|(dx, dy)| {
                board
                    .cell(c.x + dx, c.y + dy)
                    .is_some_and(|n| n.kind == c.kind && is_cube(c.kind))
            })
        })
        .map(|c| (c.x, c.y))
        .expect("level 1 always has a pair");

    session
        .commands
        .send(Request::new(2, Command::Blast { x: target.0, y: target.1 }))
        .await
        .unwrap();
    let seen = drain_until(&mut session.events, animation, |e| *e == SessionEvent::Settled).await;

    assert!(seen.contains(&SessionEvent::Ack {
        seq: 2,
        command: "blast",
        accepted: true
    }));
    assert!(seen.contains(&SessionEvent::MovesUpdated { moves_left: 19 }));
    assert!(seen.iter().any(|e| matches!(e, SessionEvent::Destroyed { .. })));
    assert!(seen.iter().any(|e| matches!(e, SessionEvent::FallStep { .. })));

    // Every event is one tagged JSON object.
    #[derive(Deserialize)]
    struct Tagged {
        #[serde(rename = "type")]
        kind: String,
    }
    for event in &seen {
        let line = event.to_line().unwrap();
        assert!(!line.contains('\n'));
        let tagged: Tagged = serde_json::from_str(&line).unwrap();
        assert!(!tagged.kind.is_empty());
    }

    // Every fall step lands inside the board.
    for event in &seen {
        if let SessionEvent::FallStep { to, .. } = event {
            assert!((0..6).contains(&to[0]) && (0..6).contains(&to[1]));
        }
    }

    drop(session.commands);
    session.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn session_rejects_input_while_resolving() {
    let config = SessionConfig {
        animation_ms: 200,
        ..config()
    };
    let animation = Duration::from_millis(config.animation_ms);
    let source = DirLevelSource::new(&config.levels_dir);
    let mut session = spawn_session(config, BoardConfig::default().with_seed(11), source);

    session.commands.send(Request::new(1, Command::Observe)).await.unwrap();
    let seen = drain_until(&mut session.events, animation, |e| {
        matches!(e, SessionEvent::Observation { .. })
    })
    .await;
    let Some(SessionEvent::Observation { board }) = seen.last() else {
        panic!("expected observation");
    };
    let pair = board
        .cells
        .iter()
        .find(|c| board.cell(c.x + 1, c.y).is_some_and(|n| n.kind == c.kind && is_cube(c.kind)))
        .map(|c| (c.x, c.y))
        .expect("level 1 always has a horizontal pair");

    for seq in [2, 3] {
        session
            .commands
            .send(Request::new(seq, Command::Blast { x: pair.0, y: pair.1 }))
            .await
            .unwrap();
    }
    let seen = drain_until(&mut session.events, animation, |e| {
        matches!(e, SessionEvent::Ack { seq: 3, .. })
    })
    .await;
    assert!(seen.contains(&SessionEvent::Ack {
        seq: 2,
        command: "blast",
        accepted: true
    }));
    assert_eq!(
        seen.last(),
        Some(&SessionEvent::Ack {
            seq: 3,
            command: "blast",
            accepted: false
        })
    );
}
