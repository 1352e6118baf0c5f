use crate::app::{RAW_PREVIEW_ROWS, Session};
use crate::model::{Theme, ViewKind};
use crate::views::{
    self, DayWise, EntityBreakdown, EntityColumn, Hourly, ListeningTime, TOP_ROWS,
};
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Clear, Dataset, Gauge, GraphType,
    Paragraph, Row, Sparkline, Table, Wrap,
};

const APP_TITLE_WITH_VERSION: &str = "Replay v0.1.0  ";

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    chart: Color,
    overlay: Color,
    popup_bg: Color,
    switch_hint: Color,
}

fn palette(theme: Theme) -> ThemePalette {
    match theme {
        Theme::Dark => ThemePalette {
            bg: Color::Rgb(10, 15, 24),
            panel_bg: Color::Rgb(19, 29, 43),
            panel_alt_bg: Color::Rgb(24, 38, 58),
            border: Color::Rgb(69, 121, 176),
            text: Color::Rgb(214, 228, 248),
            muted: Color::Rgb(149, 173, 204),
            accent: Color::Rgb(100, 203, 184),
            alert: Color::Rgb(249, 174, 88),
            chart: Color::Rgb(156, 186, 255),
            overlay: Color::Rgb(255, 122, 165),
            popup_bg: Color::Rgb(22, 33, 51),
            switch_hint: Color::Rgb(255, 122, 165),
        },
        Theme::PitchBlack => ThemePalette {
            bg: Color::Rgb(0, 0, 0),
            panel_bg: Color::Rgb(8, 8, 8),
            panel_alt_bg: Color::Rgb(15, 15, 15),
            border: Color::Rgb(74, 74, 74),
            text: Color::Rgb(242, 242, 242),
            muted: Color::Rgb(150, 150, 150),
            accent: Color::Rgb(212, 212, 212),
            alert: Color::Rgb(235, 176, 97),
            chart: Color::Rgb(178, 195, 220),
            overlay: Color::Rgb(255, 133, 168),
            popup_bg: Color::Rgb(10, 10, 10),
            switch_hint: Color::Rgb(255, 133, 168),
        },
        Theme::Matrix => ThemePalette {
            bg: Color::Rgb(4, 12, 4),
            panel_bg: Color::Rgb(8, 22, 8),
            panel_alt_bg: Color::Rgb(12, 30, 12),
            border: Color::Rgb(39, 143, 62),
            text: Color::Rgb(180, 255, 185),
            muted: Color::Rgb(102, 177, 115),
            accent: Color::Rgb(95, 255, 122),
            alert: Color::Rgb(219, 234, 114),
            chart: Color::Rgb(142, 244, 152),
            overlay: Color::Rgb(119, 255, 210),
            popup_bg: Color::Rgb(10, 26, 11),
            switch_hint: Color::Rgb(119, 255, 210),
        },
    }
}

pub fn draw(frame: &mut Frame, session: &Session) {
    let colors = palette(session.theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, session, &colors, vertical[0]);

    match session.view {
        ViewKind::Artist => draw_entity_view(frame, session, EntityColumn::Artist, &colors, vertical[1]),
        ViewKind::Track => draw_entity_view(frame, session, EntityColumn::Track, &colors, vertical[1]),
        ViewKind::DayWise => draw_day_wise(frame, session, &colors, vertical[1]),
        ViewKind::Hourly => draw_hourly(frame, session, &colors, vertical[1]),
        ViewKind::ListeningTime => draw_listening_time(frame, session, &colors, vertical[1]),
    }

    draw_footer(frame, session, &colors, vertical[2]);

    if session.show_raw {
        draw_raw_popup(frame, session, &colors);
    }
}

fn draw_header(frame: &mut Frame, session: &Session, colors: &ThemePalette, area: Rect) {
    frame.render_widget(
        panel_block("Status", colors.panel_bg, colors.text, colors.border),
        area,
    );
    let inner = area.inner(Margin {
        vertical: 0,
        horizontal: 1,
    });
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let left = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE_WITH_VERSION,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Plays {}", session.dataset.events.len()),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("{} / {}", session.format.label(), session.delimiter.label()),
            Style::default().fg(colors.alert),
        ),
    ]));
    frame.render_widget(left, chunks[0]);

    let right = Paragraph::new(view_tabs_line(session.view, colors)).alignment(Alignment::Right);
    frame.render_widget(right, chunks[1]);
}

fn view_tabs_line(selected: ViewKind, colors: &ThemePalette) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            "Press E to switch",
            Style::default()
                .fg(colors.switch_hint)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - ", Style::default().fg(colors.muted)),
    ];

    for (idx, view) in ViewKind::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" -- ", Style::default().fg(colors.muted)));
        }
        let mut style = Style::default().fg(colors.accent);
        if view == selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(view.label(), style));
    }

    Line::from(spans)
}

fn draw_entity_view(
    frame: &mut Frame,
    session: &Session,
    column: EntityColumn,
    colors: &ThemePalette,
    area: Rect,
) {
    let breakdown = views::entity_breakdown(
        &session.dataset.events,
        column,
        session.dataset.has_duration,
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(area);

    draw_uniqueness_panel(frame, &breakdown, column, colors, body[0]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);

    let time_lines = if breakdown.top_by_time.is_empty() {
        vec![Line::from(Span::styled(
            "duration column missing; listening-time ranking unavailable",
            Style::default().fg(colors.alert),
        ))]
    } else {
        let max_hours = breakdown
            .top_by_time
            .iter()
            .map(|row| row.hours)
            .fold(0.0_f64, f64::max);
        breakdown
            .top_by_time
            .iter()
            .map(|row| {
                ranked_line(
                    &row.name,
                    row.hours / max_hours.max(f64::MIN_POSITIVE),
                    format!("{:>9.3} h", row.hours),
                    colors,
                )
            })
            .collect()
    };
    let time_panel = Paragraph::new(time_lines).block(panel_block(
        &format!("Top {TOP_ROWS} {} by listening hours", column.label()),
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(time_panel, charts[0]);

    let max_plays = breakdown
        .top_by_plays
        .iter()
        .map(|row| row.plays)
        .max()
        .unwrap_or(0);
    let play_lines: Vec<Line> = breakdown
        .top_by_plays
        .iter()
        .map(|row| {
            ranked_line(
                &row.name,
                row.plays as f64 / (max_plays.max(1)) as f64,
                format!("{:>6} plays", row.plays),
                colors,
            )
        })
        .collect();
    let plays_panel = Paragraph::new(play_lines).block(panel_block(
        &format!("Top {TOP_ROWS} {} by play count", column.label()),
        colors.panel_alt_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(plays_panel, charts[1]);

    if session.show_word_cloud {
        // The cloud pools far more entities than the ranked tables show.
        let frequencies = views::cloud_frequencies(&session.dataset.events, column);
        draw_cloud_popup(
            frame,
            &format!("{} cloud", column.label()),
            frequencies
                .iter()
                .map(|(name, plays)| (name.as_str(), *plays))
                .collect(),
            colors,
        );
    }
}

fn draw_uniqueness_panel(
    frame: &mut Frame,
    breakdown: &EntityBreakdown,
    column: EntityColumn,
    colors: &ThemePalette,
    area: Rect,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Unique {}", column.label()),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} distinct out of {} plays",
                breakdown.unique, breakdown.total
            ),
            Style::default().fg(colors.text),
        )),
        Line::from(Span::styled(
            format!("{:.2}% unique", breakdown.unique_percentage),
            Style::default().fg(colors.alert),
        )),
    ])
    .block(panel_block(
        "Overview",
        colors.panel_bg,
        colors.text,
        colors.border,
    ))
    .wrap(Wrap { trim: true });
    frame.render_widget(summary, rows[0]);

    let gauge = Gauge::default()
        .block(panel_block(
            "Unique share",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .gauge_style(Style::default().fg(colors.accent).bg(colors.panel_bg))
        .ratio((breakdown.unique_percentage / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(
            format!("{:.1}%", breakdown.unique_percentage),
            Style::default().fg(colors.text),
        ));
    frame.render_widget(gauge, rows[1]);
}

fn draw_day_wise(frame: &mut Frame, session: &Session, colors: &ThemePalette, area: Rect) {
    let day = views::day_wise(&session.dataset.events);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let lines = proportion_lines(&day, colors);
    let proportions = Paragraph::new(lines).block(panel_block(
        "Usage by day of the week",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(proportions, body[0]);

    let cloud = Paragraph::new(cloud_lines(
        day.counts
            .iter()
            .map(|(name, count)| (*name, *count))
            .collect(),
        colors,
    ))
    .block(panel_block(
        "Day cloud",
        colors.panel_alt_bg,
        colors.text,
        colors.border,
    ))
    .wrap(Wrap { trim: true });
    frame.render_widget(cloud, body[1]);
}

fn proportion_lines(day: &DayWise, colors: &ThemePalette) -> Vec<Line<'static>> {
    let total = day.total.max(1);
    day.counts
        .iter()
        .map(|(name, count)| {
            let share = *count as f64 / total as f64;
            Line::from(vec![
                Span::styled(format!("{name:<10}"), Style::default().fg(colors.text)),
                Span::styled(progress_bar(share, 24), Style::default().fg(colors.chart)),
                Span::styled(
                    format!("  {:>5.1}%  ({count})", share * 100.0),
                    Style::default().fg(colors.muted),
                ),
            ])
        })
        .collect()
}

fn draw_hourly(frame: &mut Frame, session: &Session, colors: &ThemePalette, area: Rect) {
    let hourly = views::hourly(&session.dataset.events);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let labels: Vec<String> = (0..24).map(|hour| format!("{hour:02}")).collect();
    let bars: Vec<Bar> = hourly
        .buckets
        .iter()
        .zip(&labels)
        .map(|(count, label)| {
            Bar::default()
                .value(*count)
                .label(Line::from(label.as_str()))
        })
        .collect();
    let histogram = BarChart::default()
        .block(panel_block(
            "Streaming by hour of day",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .bar_width(2)
        .bar_gap(1)
        .bar_style(Style::default().fg(colors.chart))
        .value_style(
            Style::default()
                .fg(colors.bg)
                .bg(colors.chart)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(Style::default().fg(colors.muted))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(histogram, body[0]);

    draw_density_overlay(frame, &hourly, colors, body[1]);
}

fn draw_density_overlay(frame: &mut Frame, hourly: &Hourly, colors: &ThemePalette, area: Rect) {
    // The sparkline carries the smoothed shape; scale to keep sub-1 values
    // visible.
    let scaled: Vec<u64> = hourly
        .density
        .iter()
        .map(|value| (value * 100.0).round() as u64)
        .collect();
    let sparkline = Sparkline::default()
        .block(panel_block(
            "Smoothed density",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .style(Style::default().fg(colors.overlay))
        .data(scaled.iter().copied());
    frame.render_widget(sparkline, area);
}

fn draw_listening_time(frame: &mut Frame, session: &Session, colors: &ThemePalette, area: Rect) {
    let stats = views::listening_time(&session.dataset.events, session.dataset.has_duration);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut lines = vec![stat_line(
        "Total listening",
        stats
            .total_hours
            .map(|hours| format!("{hours:.2} hours"))
            .unwrap_or_else(|| String::from("-")),
        colors,
    )];
    lines.push(stat_line(
        "History span",
        stats
            .span_hours
            .map(|hours| format!("{:.1} days", hours / 24.0))
            .unwrap_or_else(|| String::from("-")),
        colors,
    ));
    lines.push(stat_line(
        "Listening share",
        stats
            .listening_percentage
            .map(|pct| format!("{pct:.2}% of possible hours"))
            .unwrap_or_else(|| String::from("-")),
        colors,
    ));
    lines.push(stat_line(
        "Average daily plays",
        stats
            .average_daily_plays
            .map(|plays| format!("{plays} plays/day"))
            .unwrap_or_else(|| String::from("-")),
        colors,
    ));
    lines.push(stat_line(
        "Busiest day",
        stats
            .busiest_day
            .map(|(date, count)| format!("{count} plays on {date}"))
            .unwrap_or_else(|| String::from("-")),
        colors,
    ));
    for warning in &stats.warnings {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            warning.clone(),
            Style::default().fg(colors.alert),
        )));
    }
    let summary = Paragraph::new(lines)
        .block(panel_block(
            "Listening time statistics",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(summary, body[0]);

    draw_per_day_chart(frame, &stats, colors, body[1]);
}

fn stat_line(label: &str, value: String, colors: &ThemePalette) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<22}"),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(colors.text)),
    ])
}

fn draw_per_day_chart(frame: &mut Frame, stats: &ListeningTime, colors: &ThemePalette, area: Rect) {
    if stats.per_day.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "no per-day data",
            Style::default().fg(colors.muted),
        ))
        .block(panel_block(
            "Plays per day",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ));
        frame.render_widget(empty, area);
        return;
    }

    let points: Vec<(f64, f64)> = stats
        .per_day
        .iter()
        .enumerate()
        .map(|(idx, (_, count))| (idx as f64, *count as f64))
        .collect();
    let max_x = (stats.per_day.len().saturating_sub(1)) as f64;
    let max_y = stats
        .per_day
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(1) as f64;
    let mean = [(0.0, stats.mean_daily_plays), (max_x.max(1.0), stats.mean_daily_plays)];

    let datasets = vec![
        Dataset::default()
            .name("plays")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(colors.chart))
            .data(&points),
        Dataset::default()
            .name("mean")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors.overlay))
            .data(&mean),
    ];

    let first_day = stats.per_day[0].0.to_string();
    let last_day = stats.per_day[stats.per_day.len() - 1].0.to_string();
    let chart = Chart::new(datasets)
        .block(panel_block(
            "Plays per day (mean overlaid)",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(colors.muted))
                .bounds([0.0, max_x.max(1.0)])
                .labels([first_day, last_day]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(colors.muted))
                .bounds([0.0, max_y * 1.1])
                .labels([String::from("0"), format!("{max_y:.0}")]),
        );
    frame.render_widget(chart, area);
}

fn draw_footer(frame: &mut Frame, session: &Session, colors: &ThemePalette, area: Rect) {
    let mut spans = vec![Span::styled(
        "Keys: E/Tab view, r raw data, w cloud, d delimiter, t theme, q quit",
        Style::default().fg(colors.muted),
    )];
    spans.push(Span::styled("  |  ", Style::default().fg(colors.muted)));
    spans.push(Span::styled(
        session.status.as_str(),
        Style::default().fg(colors.text),
    ));
    for warning in &session.dataset.warnings {
        spans.push(Span::styled("  !  ", Style::default().fg(colors.alert)));
        spans.push(Span::styled(
            warning.as_str(),
            Style::default().fg(colors.alert),
        ));
    }
    let footer = Paragraph::new(Line::from(spans)).block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, area);
}

/// The popup shows the upload as-is: the original header row and the first
/// rows' cells verbatim, before any column detection or parsing.
fn draw_raw_popup(frame: &mut Frame, session: &Session, colors: &ThemePalette) {
    let popup = centered_rect(frame.area(), 80, 60);
    frame.render_widget(Clear, popup);

    let header = Row::new(session.raw_columns.iter().map(|title| {
        Cell::from(Span::styled(
            title.as_str(),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ))
    }));

    let rows: Vec<Row> = session
        .raw_rows
        .iter()
        .map(|cells| {
            Row::new(cells.iter().map(|cell| Cell::from(cell.as_str())))
                .style(Style::default().fg(colors.text))
        })
        .collect();

    let column_count = session.raw_columns.len().max(1);
    let widths = vec![Constraint::Ratio(1, column_count as u32); column_count];
    let table = Table::new(rows, widths).header(header).block(panel_block(
        &format!("Raw data (first {RAW_PREVIEW_ROWS} rows)"),
        colors.popup_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(table, popup);
}

fn draw_cloud_popup(
    frame: &mut Frame,
    title: &str,
    frequencies: Vec<(&str, u64)>,
    colors: &ThemePalette,
) {
    let popup = centered_rect(frame.area(), 62, 58);
    frame.render_widget(Clear, popup);

    let cloud = Paragraph::new(cloud_lines(frequencies, colors))
        .block(panel_block(
            title,
            colors.popup_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(cloud, popup);
}

/// Frequency-weighted text cloud: heavier entries get hotter, bolder styles.
fn cloud_lines(frequencies: Vec<(&str, u64)>, colors: &ThemePalette) -> Vec<Line<'static>> {
    let max = frequencies
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    if max == 0 {
        return vec![Line::from(Span::styled(
            "nothing to show",
            Style::default().fg(colors.muted),
        ))];
    }

    let mut spans = Vec::with_capacity(frequencies.len() * 2);
    for (word, count) in frequencies {
        let weight = count as f64 / max as f64;
        let style = if weight >= 0.75 {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else if weight >= 0.5 {
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD)
        } else if weight >= 0.25 {
            Style::default().fg(colors.text)
        } else {
            Style::default().fg(colors.muted)
        };
        spans.push(Span::styled(word.to_string(), style));
        spans.push(Span::styled("   ", Style::default().fg(colors.muted)));
    }
    vec![Line::from(spans)]
}

fn ranked_line(name: &str, ratio: f64, value: String, colors: &ThemePalette) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            progress_bar(ratio.clamp(0.0, 1.0), 20),
            Style::default().fg(colors.chart),
        ),
        Span::styled(value, Style::default().fg(colors.alert)),
        Span::styled(format!("  {name}"), Style::default().fg(colors.text)),
    ])
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn progress_bar(ratio: f64, width: usize) -> String {
    let clamped = ratio.clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}
