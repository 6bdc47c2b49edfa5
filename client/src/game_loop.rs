use std::io;
use std::time::Duration;

use common::games::snake::{Direction, MoveOutcome, Point, Snake, SnakeGameState};
use common::games::SessionRng;
use common::{log, MoveDelta, MoveUpdate, SnakeId};
use crossterm::event::Event;
use crossterm::style::Color;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::client_config::ClientConfig;
use crate::input::{decode_key, InputAction};
use crate::remote_snakes::RemoteSnakes;
use crate::renderer::Renderer;

const LOCAL_COLORS: [Color; 2] = [Color::White, Color::Green];

/// Pause before a dead snake is erased, then the delay between its segments.
#[derive(Debug, Clone, Copy)]
pub struct DeathAnimation {
    pub pause: Duration,
    pub step: Duration,
}

impl Default for DeathAnimation {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            step: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    AllDead,
}

#[derive(Debug)]
pub enum TickResult {
    Running,
    /// The last local snake died; these are the bodies left to erase.
    AllDead(Vec<Snake>),
}

/// Builds the local arena: the first snake along the top row heading right,
/// the second along the bottom row heading left.
pub fn create_arena(config: &ClientConfig) -> (SnakeGameState, Vec<SnakeId>) {
    let field = config.field();
    let length = config.initial_length;
    let mut state = SnakeGameState::new(field, config.boundary(), SessionRng::from_random());

    let spawns = [
        (Point::new(length as i32 - 1, 0), Direction::Right),
        (Point::new(field.width - length as i32, field.height - 1), Direction::Left),
    ];
    let mut players = Vec::new();
    for (index, &(head, heading)) in spawns.iter().take(config.local_players).enumerate() {
        let id = SnakeId::new(index as i64 + 1);
        state.add_snake(id, Snake::new(head, heading, length));
        players.push(id);
    }
    (state, players)
}

pub struct GameLoop<R: Renderer> {
    state: SnakeGameState,
    /// Local snakes by player index.
    players: Vec<SnakeId>,
    renderer: R,
    remote: RemoteSnakes,
    outbound: Option<mpsc::Sender<MoveDelta>>,
    tick_interval: Duration,
    animation: DeathAnimation,
}

impl<R: Renderer> GameLoop<R> {
    pub fn new(state: SnakeGameState, players: Vec<SnakeId>, renderer: R, tick_interval: Duration) -> Self {
        Self {
            state,
            players,
            renderer,
            remote: RemoteSnakes::new(),
            outbound: None,
            tick_interval,
            animation: DeathAnimation::default(),
        }
    }

    /// Every surviving local move is reported to the relay through `deltas`.
    pub fn with_outbound(mut self, deltas: mpsc::Sender<MoveDelta>) -> Self {
        self.outbound = Some(deltas);
        self
    }

    pub async fn run<E>(&mut self, mut events: E, mut updates: Option<mpsc::Receiver<MoveUpdate>>) -> io::Result<LoopExit>
    where
        E: Stream<Item = io::Result<Event>> + Unpin,
    {
        self.draw_all()?;

        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the snakes start moving one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let TickResult::AllDead(corpses) = self.on_tick().await? {
                        self.clear_out(&corpses).await?;
                        return Ok(LoopExit::AllDead);
                    }
                }
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => {
                        if let Some(action) = decode_key(key)
                            && !self.handle_action(action)
                        {
                            return Ok(LoopExit::Quit);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => return Ok(LoopExit::Quit),
                },
                update = next_update(&mut updates) => match update {
                    Some(update) => self.remote.apply(&update, &mut self.renderer)?,
                    None => {
                        log!("Lost the server stream, continuing offline");
                        updates = None;
                        self.outbound = None;
                    }
                },
            }
        }
    }

    /// Returns false when the game should end.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::Steer { player, direction } => {
                if let Some(&id) = self.players.get(player) {
                    self.state.queue_direction(id, direction);
                }
                true
            }
            InputAction::Quit => false,
        }
    }

    pub async fn on_tick(&mut self) -> io::Result<TickResult> {
        let previous_food = self.state.food();
        let report = self.state.tick();

        for (id, outcome) in &report.moves {
            if report.deaths.contains_key(id) {
                // A snake killed by another one still made its move.
                if outcome.is_alive()
                    && let Some(tail) = outcome.old_tail
                {
                    self.renderer.clear_cell(tail)?;
                }
                continue;
            }
            let color = self.color_of(*id);
            self.renderer.draw_cell(outcome.new_head, color)?;
            if let Some(tail) = outcome.old_tail {
                self.renderer.clear_cell(tail)?;
            }
            self.send_delta(outcome).await;
        }

        let corpses: Vec<Snake> = report.removed.into_iter().map(|(_, snake)| snake).collect();
        if self.state.snakes().next().is_none() {
            self.renderer.flush()?;
            return Ok(TickResult::AllDead(corpses));
        }

        for corpse in &corpses {
            for cell in corpse.body() {
                self.erase_if_free(cell)?;
            }
        }
        if let Some(food) = self.state.food()
            && Some(food) != previous_food
        {
            self.renderer.draw_food(food)?;
        }
        self.renderer.flush()?;
        Ok(TickResult::Running)
    }

    fn draw_all(&mut self) -> io::Result<()> {
        let cells: Vec<(Point, Color)> = self
            .state
            .snakes()
            .flat_map(|(id, snake)| {
                let color = self.color_of(id);
                snake.body().map(move |cell| (cell, color))
            })
            .collect();
        for (cell, color) in cells {
            self.renderer.draw_cell(cell, color)?;
        }
        if let Some(food) = self.state.food() {
            self.renderer.draw_food(food)?;
        }
        self.renderer.flush()
    }

    fn color_of(&self, id: SnakeId) -> Color {
        let index = self.players.iter().position(|&player| player == id).unwrap_or(0);
        LOCAL_COLORS[index % LOCAL_COLORS.len()]
    }

    fn erase_if_free(&mut self, cell: Point) -> io::Result<()> {
        if self.state.snakes().any(|(_, snake)| snake.occupies(cell)) {
            return Ok(());
        }
        self.renderer.clear_cell(cell)
    }

    async fn send_delta(&mut self, outcome: &MoveOutcome) {
        let Some(deltas) = &self.outbound else {
            return;
        };
        let delta = MoveDelta {
            new_head: Some(outcome.new_head.into()),
            old_tail: outcome.old_tail.map(Into::into),
        };
        if deltas.send(delta).await.is_err() {
            log!("Connection closed, continuing offline");
            self.outbound = None;
        }
    }

    async fn clear_out(&mut self, corpses: &[Snake]) -> io::Result<()> {
        time::sleep(self.animation.pause).await;
        for corpse in corpses {
            for cell in corpse.body() {
                self.renderer.clear_cell(cell)?;
                self.renderer.flush()?;
                time::sleep(self.animation.step).await;
            }
        }
        Ok(())
    }
}

async fn next_update(updates: &mut Option<mpsc::Receiver<MoveUpdate>>) -> Option<MoveUpdate> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing::{Draw, RecordingRenderer};
    use common::games::snake::{BoundaryMode, FieldSize};
    use common::Loc;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const FIELD: FieldSize = FieldSize::new(20, 20);
    const A: SnakeId = SnakeId::new(1);
    const B: SnakeId = SnakeId::new(2);

    fn create_loop(snakes: &[(SnakeId, Snake)]) -> GameLoop<RecordingRenderer> {
        let mut state = SnakeGameState::new(FIELD, BoundaryMode::Bounded, SessionRng::new(7));
        for (id, snake) in snakes {
            state.add_snake(*id, snake.clone());
        }
        state.set_food(Some(Point::new(19, 19)));
        let players = snakes.iter().map(|(id, _)| *id).collect();
        let mut game = GameLoop::new(state, players, RecordingRenderer::default(), Duration::from_millis(1));
        game.animation = DeathAnimation {
            pause: Duration::ZERO,
            step: Duration::ZERO,
        };
        game
    }

    fn loc(x: i32, y: i32) -> Option<Loc> {
        Some(Loc { x, y })
    }

    #[tokio::test]
    async fn test_tick_draws_head_and_clears_tail() {
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]);

        assert!(matches!(game.on_tick().await.unwrap(), TickResult::Running));

        assert!(game.renderer.draws.contains(&Draw::Cell(Point::new(6, 5), Color::White)));
        assert_eq!(game.renderer.cleared(), vec![Point::new(3, 5)]);
        assert_eq!(game.renderer.flushes, 1);
    }

    #[tokio::test]
    async fn test_online_tick_sends_delta() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]).with_outbound(tx);

        game.on_tick().await.unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            MoveDelta {
                new_head: loc(6, 5),
                old_tail: loc(3, 5),
            }
        );
    }

    #[tokio::test]
    async fn test_growth_sends_delta_without_tail() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]).with_outbound(tx);
        game.state.set_food(Some(Point::new(6, 5)));

        game.on_tick().await.unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            MoveDelta {
                new_head: loc(6, 5),
                old_tail: None,
            }
        );
        assert!(game.renderer.cleared().is_empty());
        assert!(game.renderer.draws.iter().any(|draw| matches!(draw, Draw::Food(_))));
    }

    #[tokio::test]
    async fn test_fatal_move_sends_nothing() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut game = create_loop(&[(A, Snake::new(Point::new(0, 5), Direction::Left, 3))]).with_outbound(tx);

        let result = game.on_tick().await.unwrap();

        match result {
            TickResult::AllDead(corpses) => assert_eq!(corpses[0].head(), Point::new(0, 5)),
            TickResult::Running => panic!("snake should have hit the wall"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connection_falls_back_to_offline() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]).with_outbound(tx);

        game.on_tick().await.unwrap();

        assert!(game.outbound.is_none());
        assert!(matches!(game.on_tick().await.unwrap(), TickResult::Running));
    }

    #[tokio::test]
    async fn test_dead_second_player_is_erased_while_first_plays_on() {
        let mut game = create_loop(&[
            (A, Snake::new(Point::new(10, 10), Direction::Right, 3)),
            (B, Snake::new(Point::new(0, 5), Direction::Left, 3)),
        ]);

        assert!(matches!(game.on_tick().await.unwrap(), TickResult::Running));

        let cleared = game.renderer.cleared();
        for x in 0..3 {
            assert!(cleared.contains(&Point::new(x, 5)));
        }
        assert!(game.state.snake(A).is_some());
    }

    #[tokio::test]
    async fn test_steering_by_player_index() {
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]);

        assert!(game.handle_action(InputAction::Steer { player: 0, direction: Direction::Up }));
        // No second local player: ignored.
        assert!(game.handle_action(InputAction::Steer { player: 1, direction: Direction::Down }));
        game.on_tick().await.unwrap();

        assert_eq!(game.state.snake(A).unwrap().head(), Point::new(5, 4));
        assert!(!game.handle_action(InputAction::Quit));
    }

    #[tokio::test]
    async fn test_run_quits_on_ctrl_c() {
        let mut game = create_loop(&[(A, Snake::new(Point::new(5, 5), Direction::Right, 3))]);
        let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let events = tokio_stream::iter(vec![Ok::<_, io::Error>(Event::Key(quit))]);

        assert_eq!(game.run(events, None).await.unwrap(), LoopExit::Quit);
    }

    #[tokio::test]
    async fn test_run_ends_after_clear_out() {
        let mut game = create_loop(&[(A, Snake::new(Point::new(1, 5), Direction::Left, 3))]);
        let events = futures_util::stream::pending::<io::Result<Event>>();

        assert_eq!(game.run(events, None).await.unwrap(), LoopExit::AllDead);
        let cleared = game.renderer.cleared();
        for x in 0..3 {
            assert!(cleared.contains(&Point::new(x, 5)));
        }
    }

    #[tokio::test]
    async fn test_lost_server_stream_keeps_playing() {
        let (update_tx, update_rx) = mpsc::channel(4);
        drop(update_tx);
        let (delta_tx, _delta_rx) = mpsc::channel(16);
        let mut game = create_loop(&[(A, Snake::new(Point::new(2, 5), Direction::Left, 3))]).with_outbound(delta_tx);
        let events = futures_util::stream::pending::<io::Result<Event>>();

        assert_eq!(game.run(events, Some(update_rx)).await.unwrap(), LoopExit::AllDead);
    }

    #[test]
    fn test_arena_spawns_players_on_opposite_rows() {
        let config = ClientConfig {
            local_players: 2,
            ..Default::default()
        };
        let (state, players) = create_arena(&config);

        assert_eq!(players, vec![A, B]);
        let first = state.snake(A).unwrap();
        assert_eq!(first.head(), Point::new(9, 0));
        assert_eq!(first.tail(), Point::new(0, 0));
        let second = state.snake(B).unwrap();
        assert_eq!(second.head(), Point::new(40, 49));
        assert_eq!(second.tail(), Point::new(49, 49));
        assert!(state.collisions().is_empty());
    }
}
