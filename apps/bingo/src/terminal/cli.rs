use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use bingo_proto::{GameConfig, GameType, WinPattern};

use crate::config::{DEFAULT_PUBLIC_URL, PUBLIC_URL_ENV};
use crate::telemetry::logging::{LogConfig, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "bingo",
    about = "Host, play, and watch live Bingo/Raffle games",
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("BUILD_TIMESTAMP"))
)]
pub struct Cli {
    #[arg(
        long = "api-base-url",
        global = true,
        value_name = "URL",
        help = "Backend base URL for this run (takes precedence over every other source)"
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long = "public-url",
        global = true,
        env = PUBLIC_URL_ENV,
        default_value = DEFAULT_PUBLIC_URL,
        help = "Web address players open; join and board links are built from it"
    )]
    pub public_url: String,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct LoggingArgs {
    #[arg(
        long = "log-level",
        value_enum,
        global = true,
        env = "BINGO_LOG_LEVEL",
        default_value_t = LogLevel::Warn,
        help = "Minimum log level (error, warn, info, debug, trace)"
    )]
    pub level: LogLevel,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        global = true,
        env = "BINGO_LOG_FILE",
        help = "Write logs to the specified file instead of stderr"
    )]
    pub file: Option<PathBuf>,
}

impl LoggingArgs {
    pub fn to_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            file: self.file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a game and run the host controls
    Host(HostArgs),
    /// Join a game and follow the draw
    Player(PlayerArgs),
    /// Show the live board for a game
    Board(BoardArgs),
    /// Manage stored client settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameTypeArg {
    Bingo,
    Raffle,
}

impl From<GameTypeArg> for GameType {
    fn from(value: GameTypeArg) -> Self {
        match value {
            GameTypeArg::Bingo => GameType::Bingo,
            GameTypeArg::Raffle => GameType::Raffle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternArg {
    Row,
    Column,
    Diagonal,
    FourCorners,
}

impl From<PatternArg> for WinPattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Row => WinPattern::Row,
            PatternArg::Column => WinPattern::Column,
            PatternArg::Diagonal => WinPattern::Diagonal,
            PatternArg::FourCorners => WinPattern::FourCorners,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    #[arg(long, default_value = "Company Party Bingo")]
    pub name: String,

    #[arg(long = "type", value_enum, default_value_t = GameTypeArg::Bingo)]
    pub game_type: GameTypeArg,

    #[arg(long, default_value_t = 5, help = "Card size, 3 to 5")]
    pub grid_size: u8,

    #[arg(long, default_value_t = 1)]
    pub number_min: i64,

    #[arg(long, default_value_t = 75)]
    pub number_max: i64,

    #[arg(long, help = "Do not mark the center cell as FREE")]
    pub no_free_center: bool,

    #[arg(
        long = "pattern",
        value_enum,
        value_delimiter = ',',
        default_values_t = [PatternArg::Row, PatternArg::Column, PatternArg::Diagonal]
    )]
    pub patterns: Vec<PatternArg>,

    #[arg(long, default_value_t = 3)]
    pub max_winners: u32,

    #[arg(long, help = "Let one participant win more than once")]
    pub allow_duplicate_winners: bool,

    #[arg(long, default_value_t = 3, help = "Board refresh interval in seconds")]
    pub board_refresh_sec: u32,
}

impl HostArgs {
    pub fn to_game_config(&self) -> GameConfig {
        GameConfig {
            name: self.name.clone(),
            game_type: self.game_type.into(),
            grid_size: self.grid_size,
            number_min: self.number_min,
            number_max: self.number_max,
            free_center: !self.no_free_center,
            win_patterns: self.patterns.iter().copied().map(WinPattern::from).collect(),
            max_winners: self.max_winners,
            no_duplicate_winners: !self.allow_duplicate_winners,
            board_refresh_sec: self.board_refresh_sec,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlayerArgs {
    #[arg(long = "game-id", value_name = "ID")]
    pub game_id: String,

    #[arg(
        long = "name",
        value_name = "DISPLAY_NAME",
        required_unless_present = "participant_id"
    )]
    pub display_name: Option<String>,

    #[arg(
        long = "participant-id",
        value_name = "ID",
        help = "Resume an earlier participant instead of joining again"
    )]
    pub participant_id: Option<String>,

    #[arg(long = "interval", value_name = "SECONDS", help = "Poll interval override")]
    pub interval: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct BoardArgs {
    #[arg(long = "game-id", value_name = "ID")]
    pub game_id: String,

    #[arg(long = "interval", value_name = "SECONDS", help = "Poll interval override")]
    pub interval: Option<f64>,

    #[arg(long, help = "Print the current board once and exit")]
    pub once: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the active backend URL and stored settings
    Show,
    /// Store the backend base URL
    SetBaseUrl { url: String },
    /// Store the preferred board refresh interval
    SetRefresh { seconds: f64 },
    /// Remove every stored setting
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn host_defaults_match_start_form() {
        let cli = Cli::try_parse_from(["bingo", "host"]).unwrap();
        let Command::Host(args) = cli.command else {
            panic!("expected host command");
        };
        assert_eq!(args.to_game_config(), GameConfig::default());
    }

    #[test]
    fn host_flags_build_config() {
        let cli = Cli::try_parse_from([
            "bingo",
            "host",
            "--name",
            "Door Prizes",
            "--type",
            "raffle",
            "--pattern",
            "ROW,FOUR_CORNERS",
            "--no-free-center",
        ])
        .unwrap();
        let Command::Host(args) = cli.command else {
            panic!("expected host command");
        };
        let config = args.to_game_config();
        assert_eq!(config.game_type, GameType::Raffle);
        assert_eq!(config.win_patterns, vec![WinPattern::Row, WinPattern::FourCorners]);
        assert!(!config.free_center);
    }

    #[test]
    fn player_needs_name_or_participant() {
        assert!(Cli::try_parse_from(["bingo", "player", "--game-id", "G_1"]).is_err());
        assert!(
            Cli::try_parse_from(["bingo", "player", "--game-id", "G_1", "--name", "Pat"]).is_ok()
        );
        assert!(
            Cli::try_parse_from([
                "bingo",
                "player",
                "--game-id",
                "G_1",
                "--participant-id",
                "P_1"
            ])
            .is_ok()
        );
    }
}
