use crate::loader;
use crate::model::{Delimiter, FileFormat, Theme, ViewKind};
use crate::normalize::{self, Dataset};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use serde_json::Value;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How many uploaded rows the raw-data popup shows.
pub const RAW_PREVIEW_ROWS: usize = 10;

#[derive(Debug)]
pub struct AppOptions {
    pub path: PathBuf,
    pub delimiter: Delimiter,
    pub initial_view: Option<ViewKind>,
}

/// One explorer run: the loaded dataset plus the UI selections that drive
/// which view gets recomputed on draw.
pub struct Session {
    pub source: PathBuf,
    pub format: FileFormat,
    pub delimiter: Delimiter,
    pub dataset: Dataset,
    /// Header row as uploaded, before any normalization.
    pub raw_columns: Vec<String>,
    /// First [`RAW_PREVIEW_ROWS`] rows as uploaded, cells rendered verbatim.
    pub raw_rows: Vec<Vec<String>>,
    pub view: ViewKind,
    pub show_raw: bool,
    pub show_word_cloud: bool,
    pub theme: Theme,
    pub status: String,
    pub dirty: bool,
    cache_key: Option<(PathBuf, Delimiter)>,
    custom_delimiter: Option<u8>,
}

fn cell_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Session {
    pub fn open(options: AppOptions) -> Result<Self> {
        let format = loader::format_for_path(&options.path)?;
        let custom_delimiter = match options.delimiter {
            Delimiter::Custom(byte) => Some(byte),
            _ => None,
        };
        let mut session = Self {
            source: options.path,
            format,
            delimiter: options.delimiter,
            dataset: Dataset::default(),
            raw_columns: Vec::new(),
            raw_rows: Vec::new(),
            view: options.initial_view.unwrap_or_default(),
            show_raw: false,
            show_word_cloud: false,
            theme: Theme::default(),
            status: String::from("Ready"),
            dirty: true,
            cache_key: None,
            custom_delimiter,
        };
        session.ensure_loaded()?;
        session.status = format!(
            "Loaded {} play events from {}",
            session.dataset.events.len(),
            session.source.display()
        );
        Ok(session)
    }

    /// Single-entry parse cache keyed by (path, delimiter). Switching views
    /// never re-parses; changing the delimiter does.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        let key = (self.source.clone(), self.delimiter);
        if self.cache_key.as_ref() == Some(&key) {
            return Ok(());
        }
        let table = loader::load_table(&self.source, self.delimiter)?;
        self.dataset = normalize::normalize(&table)?;
        self.raw_columns = table.columns.clone();
        self.raw_rows = table
            .rows
            .iter()
            .take(RAW_PREVIEW_ROWS)
            .map(|row| {
                table
                    .columns
                    .iter()
                    .map(|column| row.get(column).map(cell_display).unwrap_or_default())
                    .collect()
            })
            .collect();
        self.cache_key = Some(key);
        self.dirty = true;
        Ok(())
    }

    pub fn select_view(&mut self, view: ViewKind) {
        self.view = view;
        self.status = format!("View: {}", view.label());
        self.dirty = true;
    }

    pub fn toggle_raw(&mut self) {
        self.show_raw = !self.show_raw;
        self.status = if self.show_raw {
            String::from("Raw data shown")
        } else {
            String::from("Raw data hidden")
        };
        self.dirty = true;
    }

    pub fn toggle_word_cloud(&mut self) {
        self.show_word_cloud = !self.show_word_cloud;
        self.status = if self.show_word_cloud {
            String::from("Word cloud shown")
        } else {
            String::from("Word cloud hidden")
        };
        self.dirty = true;
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {:?}", self.theme);
        self.dirty = true;
    }

    /// Cycles comma -> tab -> semicolon (and back through the custom
    /// delimiter when one was supplied) and re-parses. On a parse failure
    /// the previous delimiter and its cached dataset stay in place.
    pub fn cycle_delimiter(&mut self) {
        if self.format != FileFormat::Delimited {
            self.status = String::from("Delimiter applies to delimited files only");
            self.dirty = true;
            return;
        }

        let previous = self.delimiter;
        self.delimiter = self.delimiter.next(self.custom_delimiter);
        match self.ensure_loaded() {
            Ok(()) => {
                self.status = format!(
                    "Delimiter {}, {} play events",
                    self.delimiter.label(),
                    self.dataset.events.len()
                );
            }
            Err(err) => {
                self.delimiter = previous;
                self.status = format!("reload error: {err:#}");
            }
        }
        self.dirty = true;
    }
}

pub fn run(options: AppOptions) -> Result<()> {
    // Load before touching the terminal so a bad file reports cleanly.
    let mut session = Session::open(options)?;

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut last_tick = Instant::now();
    let result: Result<()> = loop {
        if session.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| crate::ui::draw(frame, &session))?;
            session.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
            KeyCode::Char('e') | KeyCode::Tab => session.select_view(session.view.next()),
            KeyCode::BackTab => session.select_view(session.view.prev()),
            KeyCode::Char('r') => session.toggle_raw(),
            KeyCode::Char('w') => session.toggle_word_cloud(),
            KeyCode::Char('d') => session.cycle_delimiter(),
            KeyCode::Char('t') => session.cycle_theme(),
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn csv_session(contents: &str) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(contents.as_bytes()).expect("write");
        let session = Session::open(AppOptions {
            path,
            delimiter: Delimiter::Comma,
            initial_view: None,
        })
        .expect("open");
        (dir, session)
    }

    #[test]
    fn open_loads_and_reports_event_count() {
        let (_dir, session) = csv_session(
            "endTime,artistName,trackName\n\
             2021-01-01 10:00,Neon,Night Drive\n\
             2021-01-02 11:00,Blue,Harbor\n",
        );
        assert_eq!(session.dataset.events.len(), 2);
        assert!(session.status.contains("2 play events"));
    }

    #[test]
    fn view_switch_hits_the_cache() {
        let (_dir, mut session) = csv_session(
            "endTime,artistName,trackName\n2021-01-01 10:00,Neon,Night Drive\n",
        );
        // With the file gone, only the cache can satisfy this.
        fs::remove_file(&session.source).expect("remove");
        session.select_view(ViewKind::Hourly);
        session.ensure_loaded().expect("cache hit");
        assert_eq!(session.dataset.events.len(), 1);
    }

    #[test]
    fn delimiter_change_invalidates_the_cache() {
        let (_dir, mut session) = csv_session(
            "endTime,artistName,trackName\n2021-01-01 10:00,Neon,Night Drive\n",
        );
        fs::remove_file(&session.source).expect("remove");
        session.cycle_delimiter();
        // Reload failed: delimiter reverts, cached dataset stays usable.
        assert_eq!(session.delimiter, Delimiter::Comma);
        assert!(session.status.contains("reload error"));
        assert_eq!(session.dataset.events.len(), 1);
    }

    #[test]
    fn wrong_delimiter_reverts_and_keeps_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "endTime;artistName;trackName\n2021-01-01 10:00;Neon;Night Drive\n",
        )
        .expect("write");
        let mut session = Session::open(AppOptions {
            path,
            delimiter: Delimiter::Semicolon,
            initial_view: None,
        })
        .expect("open");

        // Comma sees one column and no timestamp candidate.
        session.cycle_delimiter();
        assert_eq!(session.delimiter, Delimiter::Semicolon);
        assert!(session.status.contains("reload error"));
        assert_eq!(session.dataset.events.len(), 1);
    }

    #[test]
    fn delimiter_cycle_reparses_the_file() {
        // A single-column file parses under every delimiter, so the cycle
        // goes through and the parse runs again.
        let (_dir, mut session) = csv_session("endTime\n2021-01-01 10:00\n");
        session.cycle_delimiter();
        assert_eq!(session.delimiter, Delimiter::Tab);
        assert!(session.status.contains("1 play events"));
    }

    #[test]
    fn raw_preview_keeps_uploaded_columns_and_cells() {
        let (_dir, session) = csv_session(
            "endTime,artistName,trackName,msPlayed\n\
             2021-01-01 10:37,Neon,Night Drive,215000\n",
        );
        assert_eq!(
            session.raw_columns,
            vec!["endTime", "artistName", "trackName", "msPlayed"]
        );
        // The uploaded cells survive untouched, minutes included.
        assert_eq!(
            session.raw_rows[0],
            vec!["2021-01-01 10:37", "Neon", "Night Drive", "215000"]
        );
    }

    #[test]
    fn raw_preview_is_capped() {
        let mut contents = String::from("endTime,artistName,trackName\n");
        for day in 1..=12 {
            contents.push_str(&format!("2021-01-{day:02} 10:00,Neon,Night Drive\n"));
        }
        let (_dir, session) = csv_session(&contents);
        assert_eq!(session.dataset.events.len(), 12);
        assert_eq!(session.raw_rows.len(), RAW_PREVIEW_ROWS);
    }

    #[test]
    fn custom_delimiter_survives_the_cycle() {
        // A single-column file parses under every delimiter, so four
        // presses walk custom -> comma -> tab -> semicolon -> custom.
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        fs::write(&path, "endTime\n2021-01-01 10:00\n").expect("write");
        let mut session = Session::open(AppOptions {
            path,
            delimiter: Delimiter::Custom(b'|'),
            initial_view: None,
        })
        .expect("open");

        for _ in 0..4 {
            session.cycle_delimiter();
        }
        assert_eq!(session.delimiter, Delimiter::Custom(b'|'));
    }

    #[test]
    fn delimiter_cycle_refused_for_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{"endTime": "2021-01-01 10:00", "artistName": "Neon"}]"#,
        )
        .expect("write");
        let mut session = Session::open(AppOptions {
            path,
            delimiter: Delimiter::Comma,
            initial_view: None,
        })
        .expect("open");

        session.cycle_delimiter();
        assert_eq!(session.delimiter, Delimiter::Comma);
        assert!(session.status.contains("delimited files only"));
    }
}
