use time::PrimitiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Delimited,
}

impl FileFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Delimited => "delimited text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
    Custom(u8),
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Semicolon => b';',
            Self::Custom(byte) => byte,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Comma => String::from("comma (,)"),
            Self::Tab => String::from("tab (\\t)"),
            Self::Semicolon => String::from("semicolon (;)"),
            Self::Custom(byte) => format!("custom ({})", char::from(byte)),
        }
    }

    /// Cycles comma -> tab -> semicolon, detouring through the custom
    /// delimiter when the user supplied one.
    pub fn next(self, custom: Option<u8>) -> Self {
        match self {
            Self::Comma => Self::Tab,
            Self::Tab => Self::Semicolon,
            Self::Semicolon => custom.map(Self::Custom).unwrap_or(Self::Comma),
            Self::Custom(_) => Self::Comma,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Artist,
    Track,
    DayWise,
    Hourly,
    ListeningTime,
}

impl ViewKind {
    pub const ALL: [Self; 5] = [
        Self::Artist,
        Self::Track,
        Self::DayWise,
        Self::Hourly,
        Self::ListeningTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Artist => "Artists",
            Self::Track => "Tracks",
            Self::DayWise => "Day-wise",
            Self::Hourly => "Hourly",
            Self::ListeningTime => "Listening Time",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Artist => Self::Track,
            Self::Track => Self::DayWise,
            Self::DayWise => Self::Hourly,
            Self::Hourly => Self::ListeningTime,
            Self::ListeningTime => Self::Artist,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Artist => Self::ListeningTime,
            Self::Track => Self::Artist,
            Self::DayWise => Self::Track,
            Self::Hourly => Self::DayWise,
            Self::ListeningTime => Self::Hourly,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "artist" | "artists" => Some(Self::Artist),
            "track" | "tracks" => Some(Self::Track),
            "day" | "daywise" | "day-wise" => Some(Self::DayWise),
            "hour" | "hourly" => Some(Self::Hourly),
            "stats" | "time" | "listening-time" => Some(Self::ListeningTime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    PitchBlack,
    Matrix,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::PitchBlack,
            Self::PitchBlack => Self::Matrix,
            Self::Matrix => Self::Dark,
        }
    }
}

/// One normalized play event. Raw timestamp/duration columns are gone by the
/// time this exists; only the parsed timestamp and derived fields remain.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub artist: Option<String>,
    pub track: Option<String>,
    pub played_at: PrimitiveDateTime,
    pub year: i32,
    pub month: u8,
    pub day: u8,
    /// Monday = 0 .. Sunday = 6.
    pub weekday: u8,
    pub weekday_name: &'static str,
    pub hour: u8,
    pub hours_played: Option<f64>,
    pub minutes_played: Option<f64>,
}
