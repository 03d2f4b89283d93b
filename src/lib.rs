pub mod chess_game;
