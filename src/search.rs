use std::fmt::Display;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::board::Board;
use crate::evaluation::{Evaluation, Score};
use crate::move_generator::{generate, has_legal_move, is_quiet, GenType};
use crate::piece::Color;
use crate::r#move::Move;
use crate::transposition_table::{Bound, TranspositionTable, TtEntry};

/// Groups together every knob of a search.
/// Avoids passing around 6 arguments in functions
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub max_depth: u8,
    pub max_time: Duration,
    pub max_nodes: Option<u64>,
    /// Fraction of the time budget after which no new iteration is started
    pub deepening_cutoff: f64,
    pub node_check_interval: u64,
    /// Capture plies searched past the horizon
    pub quiescence_depth: u8,
    /// Forces quiescence search on or off, None lets the depth decide
    pub quiescence: Option<bool>,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth: 3,
            max_time: Duration::from_secs(3),
            max_nodes: None,
            deepening_cutoff: 0.7,
            node_check_interval: 1024,
            quiescence_depth: 4,
            quiescence: None,
        }
    }
}
impl SearchOptions {
    pub fn set_depth(&mut self, value: u8) -> &mut Self {
        self.max_depth = value;
        self
    }
    pub fn set_time(&mut self, value: Duration) -> &mut Self {
        self.max_time = value;
        self
    }
    pub fn set_nodes_to_search(&mut self, value: Option<u64>) -> &mut Self {
        self.max_nodes = value;
        self
    }
    pub fn set_node_check_interval(&mut self, value: u64) -> &mut Self {
        self.node_check_interval = value.max(1);
        self
    }
    pub fn set_quiescence_depth(&mut self, value: u8) -> &mut Self {
        self.quiescence_depth = value;
        self
    }

    pub fn set_quiescence(&mut self, value: Option<bool>) -> &mut Self {
        self.quiescence = value;
        self
    }

    /// Shallow searches stay fast by scoring the horizon statically
    pub fn quiescence_enabled(&self) -> bool {
        self.quiescence.unwrap_or(self.max_depth > 2)
    }
}

/// Report of a finished search
#[derive(Clone, Debug)]
pub struct Search {
    pub best_move: Option<Move>,
    /// Score of the best move from the searching side's point of view
    pub score: Score,
    pub principal_variation: Vec<Move>,
    pub time: Duration,
    pub depth_reached: u8,
    pub nodes_searched: u64,
    /// Whether the last iteration was interrupted by the time or node budget
    pub cancelled: bool,
}
impl Search {
    /// Full moves until mate, negative when the searching side gets mated
    pub fn mate_in(&self) -> Option<Score> {
        if !Evaluation::is_mate_score(self.score) {
            return None;
        }
        let moves = (Evaluation::MATE_SCORE - self.score.abs() + 1) / 2;
        Some(if self.score < 0 { -moves } else { moves })
    }
}
impl Display for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "depth {} time {} nodes {} nps {} score {} pv {}",
            self.depth_reached,
            self.time.as_millis(),
            self.nodes_searched,
            ((self.nodes_searched as f64) / self.time.as_secs_f64().max(1e-6)) as u64,
            match self.mate_in() {
                Some(moves) => format!("mate {}", moves),
                None => format!("cp {}", self.score),
            },
            self.principal_variation
                .iter()
                .fold(String::new(), |acc, m| format!("{} {}", acc, m))
                .trim(),
        )
    }
}
impl Default for Search {
    fn default() -> Self {
        Search {
            best_move: None,
            score: 0,
            principal_variation: Default::default(),
            time: Duration::ZERO,
            depth_reached: 0,
            nodes_searched: 0,
            cancelled: false,
        }
    }
}

const INFINITY: Score = Evaluation::MATE_SCORE + 1;

/// Raised when the time or node budget runs out mid-search.
/// Every recursive call undoes its move before passing it up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Cancelled;
type SearchResult<T> = Result<T, Cancelled>;

type Killers = [Option<Move>; 2];

/// A move picker owning its transposition table and killer moves.
/// One engine serves one game at a time.
pub struct Engine {
    transposition_table: TranspositionTable,
    killers: Vec<Killers>,
}
impl Engine {
    pub fn new() -> Engine {
        Engine {
            transposition_table: TranspositionTable::default(),
            killers: vec![],
        }
    }

    pub fn with_table_size(size: usize) -> Engine {
        Engine {
            transposition_table: TranspositionTable::new(size),
            killers: vec![],
        }
    }

    /// Picks a move for `side`, which must be the side to move.
    /// Returns None when `side` is not to move or has no legal move.
    /// The board is given back exactly as it was received.
    pub fn search(&mut self, board: &mut Board, side: Color, max_depth: u8, time_budget: Duration) -> Option<Move> {
        if board.side_to_move() != side {
            warn!("asked to search for {} while {} is to move", side.name(), board.side_to_move().name());
            return None;
        }
        let mut options = SearchOptions::default();
        options.set_depth(max_depth).set_time(time_budget);
        self.run(board, &options).best_move
    }

    /// Iterative deepening driver: searches depth 1, 2... until the depth,
    /// time or node budget runs out, keeping the result of the deepest
    /// completed iteration
    pub fn run(&mut self, board: &mut Board, options: &SearchOptions) -> Search {
        let start = Instant::now();
        self.transposition_table.clear();
        self.killers = vec![[None; 2]; options.max_depth as usize + 1];

        let mut result = Search::default();
        let root_moves = generate(board, GenType::Legal);
        if root_moves.is_empty() {
            debug!("no legal move in {}", board.to_fen());
            return result;
        }

        let mut context = SearchContext {
            transposition_table: &mut self.transposition_table,
            killers: &mut self.killers,
            options,
            start,
            nodes: 0,
            root_side: board.side_to_move(),
        };

        for depth in 1..=options.max_depth {
            let elapsed = start.elapsed();
            if elapsed >= options.max_time
                || (depth > 1 && elapsed.as_secs_f64() > options.max_time.as_secs_f64() * options.deepening_cutoff)
            {
                debug!("not enough time left to start depth {}", depth);
                break;
            }

            match context.search_root(board, depth, result.best_move) {
                Ok((mv, score)) => {
                    result.best_move = Some(mv);
                    result.score = score;
                    result.depth_reached = depth;
                    result.nodes_searched = context.nodes;
                    result.time = start.elapsed();
                    result.principal_variation = context.collect_pv(board, depth);
                    debug!("{}", result);
                }
                Err(Cancelled) => {
                    trace!("depth {} cancelled after {} nodes", depth, context.nodes);
                    result.cancelled = true;
                    break;
                }
            }
        }

        if result.best_move.is_none() {
            let fallback = root_moves.first().copied();
            if let Some(mv) = fallback {
                warn!("no iteration completed, falling back to {}", mv);
                result.principal_variation = vec![mv];
            }
            result.best_move = fallback;
        }
        result.nodes_searched = context.nodes;
        result.time = start.elapsed();
        info!("{}", result);
        result
    }

    /// What the last search left in the table for this position
    pub fn probe(&self, board: &Board) -> Option<TtEntry> {
        self.transposition_table.probe(board.hash())
    }
}
impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

struct SearchContext<'a> {
    transposition_table: &'a mut TranspositionTable,
    killers: &'a mut Vec<Killers>,
    options: &'a SearchOptions,
    start: Instant,
    nodes: u64,
    root_side: Color,
}
impl SearchContext<'_> {
    /// Searches every root move with a full window, best move of the previous
    /// iteration first
    fn search_root(&mut self, board: &mut Board, depth: u8, previous_best: Option<Move>) -> SearchResult<(Move, Score)> {
        let moves = generate(board, GenType::Legal);
        let ordered = moves.best_first_iter(&|m: &Move| move_order_score(board, m, previous_best, &[None; 2]));

        let mut alpha = -INFINITY;
        let mut best = None;
        for mv in ordered {
            let record = board.make(*mv);
            let score = self.alpha_beta(board, depth - 1, 1, -INFINITY, -alpha).map(|s| -s);
            board.undo(record);
            let score = score?;

            if best.is_none() || score > alpha {
                alpha = score;
                best = Some((*mv, score));
            }
        }

        let (best_move, score) = best.expect("root searched without a legal move");
        self.transposition_table.store(TtEntry {
            hash: board.hash(),
            depth,
            score,
            bound: Bound::Exact,
            best_move: Some(best_move),
        });
        Ok((best_move, score))
    }

    fn alpha_beta(&mut self, board: &mut Board, depth: u8, ply: usize, mut alpha: Score, beta: Score) -> SearchResult<Score> {
        self.count_node()?;

        let hash = board.hash();
        let mut hash_move = None;
        if let Some(entry) = self.transposition_table.probe(hash) {
            let entry = TtEntry { score: score_from_table(entry.score, ply), ..entry };
            if let Some(score) = entry.cutoff(depth, alpha, beta) {
                return Ok(score);
            }
            hash_move = entry.best_move;
        }

        if depth == 0 {
            return self.horizon(board, ply, alpha, beta);
        }

        let side = board.side_to_move();
        let moves = generate(board, GenType::Legal);
        if moves.is_empty() {
            return Ok(if board.in_check(side) { mated_in(ply) } else { Evaluation::DRAW_SCORE });
        }

        let original_alpha = alpha;
        let killers = self.killers.get(ply).copied().unwrap_or_default();
        let ordered = moves.best_first_iter(&|m: &Move| move_order_score(board, m, hash_move, &killers));

        let mut best_score = -INFINITY;
        let mut best_move = None;
        for mv in ordered {
            let record = board.make(*mv);
            let score = self.alpha_beta(board, depth - 1, ply + 1, -beta, -alpha).map(|s| -s);
            board.undo(record);
            let score = score?;

            if score > best_score {
                best_score = score;
                best_move = Some(*mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if is_quiet(board, mv) {
                    self.store_killer(ply, *mv);
                }
                break;
            }
        }

        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.transposition_table.store(TtEntry {
            hash,
            depth,
            score: score_to_table(best_score, ply),
            bound,
            best_move,
        });
        Ok(best_score)
    }

    /// Scores a node at the end of the regular search
    fn horizon(&mut self, board: &mut Board, ply: usize, alpha: Score, beta: Score) -> SearchResult<Score> {
        if self.options.quiescence_enabled() {
            return self.quiescence(board, ply, 0, alpha, beta);
        }
        let side = board.side_to_move();
        if !has_legal_move(board) {
            return Ok(if board.in_check(side) { mated_in(ply) } else { Evaluation::DRAW_SCORE });
        }
        Ok(self.static_eval(board))
    }

    /// Only follows captures until the position is quiet, starting from the
    /// static evaluation as a lower bound (standing pat)
    fn quiescence(&mut self, board: &mut Board, ply: usize, capture_plies: u8, mut alpha: Score, beta: Score) -> SearchResult<Score> {
        self.count_node()?;

        let side = board.side_to_move();
        if board.in_check(side) && !has_legal_move(board) {
            return Ok(mated_in(ply));
        }

        let stand_pat = self.static_eval(board);
        if stand_pat >= beta {
            return Ok(stand_pat);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if capture_plies >= self.options.quiescence_depth {
            return Ok(alpha);
        }

        let captures = generate(board, GenType::Captures);
        let ordered = captures.best_first_iter(&|m: &Move| capture_score(board, m));
        for mv in ordered {
            let record = board.make(*mv);
            let score = self.quiescence(board, ply + 1, capture_plies + 1, -beta, -alpha).map(|s| -s);
            board.undo(record);
            let score = score?;

            if score >= beta {
                return Ok(score);
            }
            if score > alpha {
                alpha = score;
            }
        }
        Ok(alpha)
    }

    /// Evaluation from the searching side, turned around for the side to move
    fn static_eval(&self, board: &Board) -> Score {
        let score = Evaluation::evaluate(board, self.root_side);
        if board.side_to_move() == self.root_side { score } else { -score }
    }

    fn count_node(&mut self) -> SearchResult<()> {
        self.nodes += 1;
        if self.nodes % self.options.node_check_interval.max(1) != 0 {
            return Ok(());
        }
        let out_of_time = self.start.elapsed() >= self.options.max_time;
        let out_of_nodes = self.options.max_nodes.map_or(false, |max| self.nodes >= max);
        if out_of_time || out_of_nodes {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn store_killer(&mut self, ply: usize, mv: Move) {
        if let Some(killers) = self.killers.get_mut(ply) {
            if killers[0] != Some(mv) {
                killers[1] = killers[0];
                killers[0] = Some(mv);
            }
        }
    }

    /// Follows best moves through the table, stopping on unknown positions,
    /// moves that are not legal (key collisions) and repetitions
    fn collect_pv(&self, board: &mut Board, max_length: u8) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_length as usize);
        let mut records = vec![];
        let mut seen = vec![];
        while pv.len() < max_length as usize {
            let hash = board.hash();
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);
            let mv = match self.transposition_table.probe(hash).and_then(|e| e.best_move) {
                Some(mv) if generate(board, GenType::Legal).contains(&mv) => mv,
                _ => break,
            };
            records.push(board.make(mv));
            pv.push(mv);
        }
        while let Some(record) = records.pop() {
            board.undo(record);
        }
        pv
    }
}

fn mated_in(ply: usize) -> Score {
    -Evaluation::MATE_SCORE + ply as Score
}

// Mate scores are stored relative to the node rather than to the root, so
// that they stay correct when the position is reached at another ply
fn score_to_table(score: Score, ply: usize) -> Score {
    if Evaluation::is_mate_score(score) {
        if score > 0 { score + ply as Score } else { score - ply as Score }
    } else {
        score
    }
}

fn score_from_table(score: Score, ply: usize) -> Score {
    if Evaluation::is_mate_score(score) {
        if score > 0 { score - ply as Score } else { score + ply as Score }
    } else {
        score
    }
}

/// Table move first, then captures by MVV-LVA, killers, promotions and
/// finally quiet moves in generation order
fn move_order_score(board: &Board, mv: &Move, hash_move: Option<Move>, killers: &Killers) -> Score {
    let mut score = 0;
    if Some(*mv) == hash_move {
        score += 100_000;
    }
    score += capture_score(board, mv);
    if killers[0] == Some(*mv) {
        score += 9_000;
    } else if killers[1] == Some(*mv) {
        score += 8_000;
    }
    if mv.is_promotion() {
        score += 5_000;
    }
    score
}

fn capture_score(board: &Board, mv: &Move) -> Score {
    match (board.victim(mv), board.piece_at(mv.origin())) {
        (Some(victim), Some(attacker)) => Evaluation::mvv_lva(victim.piece_type, attacker.piece_type),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::parse_square;

    fn options(depth: u8) -> SearchOptions {
        let mut options = SearchOptions::default();
        options.set_depth(depth).set_time(Duration::from_secs(60));
        options
    }

    fn best(fen: &str, depth: u8) -> Search {
        let mut board = Board::from_fen(fen).unwrap();
        let before = board.clone();
        let result = Engine::with_table_size(1 << 14).run(&mut board, &options(depth));
        assert_eq!(board, before, "search left the board modified");
        result
    }

    #[test]
    fn finds_back_rank_mate() {
        for depth in [1, 2, 3] {
            let result = best("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", depth);
            assert_eq!(result.best_move.map(|m| m.to_string()), Some("a1a8".to_string()), "depth {}", depth);
            assert_eq!(result.score, Evaluation::MATE_SCORE - 1);
            assert_eq!(result.mate_in(), Some(1));
        }
    }

    #[test]
    fn wins_a_hanging_queen() {
        let result = best("4k3/8/8/3q4/8/8/3R4/3K4 w - - 0 1", 3);
        assert_eq!(result.best_move.map(|m| m.to_string()), Some("d2d5".to_string()));
        assert!(result.score > 0);
    }

    #[test]
    fn sees_mate_coming() {
        // Black mates with Qh4 next move whatever white does
        let result = best("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2", 1);
        assert_eq!(result.best_move.map(|m| m.to_string()), Some("d8h4".to_string()));
        assert_eq!(result.mate_in(), Some(1));
    }

    #[test]
    fn no_move_when_mated_or_not_to_move() {
        let mut engine = Engine::new();
        let mut mated = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert_eq!(engine.search(&mut mated, Color::White, 3, Duration::from_secs(1)), None);

        let mut board = Board::new();
        assert_eq!(engine.search(&mut board, Color::Black, 3, Duration::from_secs(1)), None);
    }

    #[test]
    fn zero_budget_falls_back_to_the_first_legal_move() {
        let mut board = Board::new();
        let first = *generate(&mut board, GenType::Legal).first().unwrap();
        let mut engine = Engine::new();
        assert_eq!(engine.search(&mut board, Color::White, 3, Duration::ZERO), Some(first));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn node_budget_cancels_and_restores_the_board() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut board = Board::from_fen(fen).unwrap();
        let mut opts = options(8);
        opts.set_nodes_to_search(Some(5_000)).set_node_check_interval(64);
        let result = Engine::with_table_size(1 << 12).run(&mut board, &opts);
        assert!(result.cancelled);
        assert!(result.depth_reached < 8);
        assert!(result.best_move.is_some());
        assert_eq!(board, Board::from_fen(fen).unwrap());
    }

    #[test]
    fn repeated_search_agrees_with_itself() {
        let fen = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";
        let mut board = Board::from_fen(fen).unwrap();
        let mut engine = Engine::with_table_size(1 << 14);
        let first = engine.run(&mut board, &options(3));
        let root = engine.probe(&board).unwrap();
        assert_eq!(root.bound, Bound::Exact);
        assert_eq!(root.depth, 3);
        assert_eq!(root.score, first.score);
        assert_eq!(root.best_move, first.best_move);

        let second = engine.run(&mut board, &options(3));
        assert_eq!(first.best_move, second.best_move);
        assert_eq!(first.score, second.score);
        assert_eq!(first.principal_variation.first(), first.best_move.as_ref());
    }

    #[test]
    fn killers_are_quiet_moves_per_ply() {
        let mut table = TranspositionTable::new(16);
        let mut killers = vec![[None; 2]; 4];
        let opts = options(3);
        let mut context = SearchContext {
            transposition_table: &mut table,
            killers: &mut killers,
            options: &opts,
            start: Instant::now(),
            nodes: 0,
            root_side: Color::White,
        };
        let a = Move::new_normal(parse_square("g1").unwrap(), parse_square("f3").unwrap());
        let b = Move::new_normal(parse_square("b1").unwrap(), parse_square("c3").unwrap());
        context.store_killer(2, a);
        context.store_killer(2, a);
        assert_eq!(context.killers[2], [Some(a), None]);
        context.store_killer(2, b);
        assert_eq!(context.killers[2], [Some(b), Some(a)]);
        // out of range plies are ignored
        context.store_killer(10, a);
    }

    #[test]
    fn ordering_puts_table_move_and_captures_first() {
        let board = Board::from_fen("4k3/8/8/3q4/4P3/8/8/R3K3 w - - 0 1").unwrap();
        let capture = Move::new_normal(parse_square("e4").unwrap(), parse_square("d5").unwrap());
        let quiet = Move::new_normal(parse_square("a1").unwrap(), parse_square("a2").unwrap());
        let none = [None; 2];
        assert!(move_order_score(&board, &capture, None, &none) > move_order_score(&board, &quiet, None, &none));
        assert!(move_order_score(&board, &quiet, Some(quiet), &none) > move_order_score(&board, &capture, None, &none));
        assert!(move_order_score(&board, &quiet, None, &[Some(quiet), None]) > move_order_score(&board, &quiet, None, &none));
    }

    #[test]
    fn mate_scores_are_stored_relative_to_the_node() {
        let mate = Evaluation::MATE_SCORE - 5;
        assert_eq!(score_from_table(score_to_table(mate, 3), 3), mate);
        assert_eq!(score_to_table(mate, 3), Evaluation::MATE_SCORE - 2);
        assert_eq!(score_to_table(-mate, 3), -Evaluation::MATE_SCORE + 2);
        assert_eq!(score_to_table(120, 3), 120);
    }

    #[test]
    fn quiescence_follows_depth_unless_forced() {
        let mut opts = SearchOptions::default();
        assert!(opts.quiescence_enabled());
        opts.set_depth(2);
        assert!(!opts.quiescence_enabled());
        opts.set_quiescence(Some(true));
        assert!(opts.quiescence_enabled());
    }

    #[test]
    fn quiescence_sees_the_recapture() {
        // Taking the pawn on d5 loses the queen to the c6 pawn: a depth 1
        // search only avoids it by looking at captures past the horizon
        let mut opts = options(1);
        opts.set_quiescence(Some(true));
        let mut board = Board::from_fen("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let result = Engine::with_table_size(1 << 12).run(&mut board, &opts);
        assert_ne!(result.best_move.map(|m| m.to_string()), Some("d2d5".to_string()));
    }

    #[test]
    fn display_reports_mates() {
        let search = Search { score: -Evaluation::MATE_SCORE + 4, ..Default::default() };
        assert!(search.to_string().contains("mate -2"));
        let search = Search { score: 35, ..Default::default() };
        assert!(search.to_string().contains("cp 35"));
    }
}
