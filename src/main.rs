use std::io::{self, BufRead, Write};

use chessmate::chess_game::fen;
use chessmate::chess_game::{ChessSquare, Color, Game, MoveOutcome, Outcome, PieceKind};

use clap::arg;
use clap::command;
use clap::Command;

use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;

fn main() {
    let matches = command!()
        .version("v0.1.0")
        .propagate_version(true)
        .subcommand(
            Command::new("play").about("Play a game on the terminal").arg(
                arg!(
                -f --fen <FEN> "Starting position"
                        )
                .default_value(fen::INITIAL_POSITION),
            ),
        )
        .subcommand(
            Command::new("show")
                .about("Print a position and its verdict")
                .arg(
                    arg!(
                    -f --fen <FEN> "Board position"
                            )
                    .default_value(fen::INITIAL_POSITION),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("play", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").unwrap();
            match fen::from_fen(fen) {
                Ok(game) => play(game),
                Err(e) => eprintln!("Invalid FEN string: {}", e),
            }
        }
        Some(("show", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").unwrap();
            match fen::from_fen(fen) {
                Ok(game) => show(&game),
                Err(e) => eprintln!("Invalid FEN string: {}", e),
            }
        }
        None => match fen::from_fen(fen::INITIAL_POSITION) {
            Ok(game) => play(game),
            Err(e) => eprintln!("Invalid FEN string: {}", e),
        },
        _ => unreachable!("Exhausted list of subcommands"),
    }
}

fn show(game: &Game) {
    println!("{}", game.render_to_string());
    println!("Side to move: {:?}", game.side_to_move());
    match game.outcome() {
        Outcome::InProgress => {
            if game.is_in_check(game.side_to_move()) {
                println!("Verdict: check");
            } else {
                println!("Verdict: in progress");
            }
        }
        Outcome::Checkmate(color) => println!("Verdict: {:?} is checkmated", color),
        Outcome::Stalemate => println!("Verdict: stalemate"),
    }
}

fn play(mut game: Game) {
    println!("Enter moves as coordinates (e2e4, e7e8q), or: undo redo history board fen quit");
    println!("{}", game.render_to_string());

    let stdin = io::stdin();
    loop {
        print!("{:?}> ", game.side_to_move());
        let _ = io::stdout().flush();
        let Some(Ok(line)) = stdin.lock().lines().next() else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "exit" => break,
            "board" => {
                println!("{}", game.render_to_string());
                continue;
            }
            "fen" => {
                println!("{}", fen::to_fen(&game));
                continue;
            }
            "history" => {
                print_history(&game);
                continue;
            }
            "undo" => {
                if !game.undo() {
                    println!("Nothing to undo");
                }
                println!("{}", game.render_to_string());
                continue;
            }
            "redo" => {
                if !game.redo() {
                    println!("Nothing to redo");
                }
                println!("{}", game.render_to_string());
                continue;
            }
            _ => {}
        }

        let Some((from, to, promotion)) = parse_move(input) else {
            println!("Unrecognized input: {}", input);
            continue;
        };
        match game.try_move(from, to, promotion) {
            Ok(MoveOutcome::PromotionPending) => resolve_promotion(&mut game),
            Ok(_) => {}
            Err(e) => {
                println!("Rejected: {}", e);
                continue;
            }
        }

        println!("{}", game.render_to_string());
        match game.outcome() {
            Outcome::InProgress => {
                if game.is_in_check(game.side_to_move()) {
                    println!("{:?} is in check", game.side_to_move());
                }
            }
            Outcome::Checkmate(color) => {
                println!("Checkmate! {:?} wins", color.opposite());
                break;
            }
            Outcome::Stalemate => {
                println!("Stalemate, the game is drawn");
                break;
            }
        }
    }
}

fn resolve_promotion(game: &mut Game) {
    let stdin = io::stdin();
    loop {
        let Some(square) = game.pending_promotion() else {
            return;
        };
        print!("Promote the pawn on {} to (q/r/b/n): ", square.as_algebraic());
        let _ = io::stdout().flush();
        let Some(Ok(line)) = stdin.lock().lines().next() else {
            return;
        };
        let Some(kind) = promotion_kind(line.trim()) else {
            println!("Choose one of q, r, b or n");
            continue;
        };
        if game.complete_promotion(square, kind).is_ok() {
            return;
        }
    }
}

fn parse_move(input: &str) -> Option<(ChessSquare, ChessSquare, Option<PieceKind>)> {
    if !input.is_ascii() || (input.len() != 4 && input.len() != 5) {
        return None;
    }
    let from = ChessSquare::try_from_algebraic(&input[0..2])?;
    let to = ChessSquare::try_from_algebraic(&input[2..4])?;
    let promotion = if input.len() == 5 {
        Some(promotion_kind(&input[4..5])?)
    } else {
        None
    };
    Some((from, to, promotion))
}

fn promotion_kind(letter: &str) -> Option<PieceKind> {
    match letter {
        "q" => Some(PieceKind::Queen),
        "r" => Some(PieceKind::Rook),
        "b" => Some(PieceKind::Bishop),
        "n" => Some(PieceKind::Knight),
        _ => None,
    }
}

#[derive(Tabled)]
struct HistoryRow {
    ply: usize,
    side: String,
    chess_move: String,
}

fn print_history(game: &Game) {
    if game.history().is_empty() {
        println!("No moves played");
        return;
    }
    let rows: Vec<HistoryRow> = game
        .history()
        .iter()
        .enumerate()
        .map(|(i, mv)| HistoryRow {
            ply: i + 1,
            side: if i % 2 == 0 {
                format!("{:?}", Color::White)
            } else {
                format!("{:?}", Color::Black)
            },
            chess_move: mv.as_algebraic(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::modern()));
}
