pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use tarix_wpm::{
    comparator::CharClass, events::Severity, session::Phase, stats::PerformanceTier,
    util::count_words,
};

use crate::{App, Theme};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const CHART_HEIGHT: u16 = 9;

/// Colours for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub accent: Color,
    pub background: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                text: Color::White,
                dim: Color::DarkGray,
                correct: Color::Green,
                incorrect: Color::Red,
                accent: Color::Magenta,
                background: Color::Reset,
            },
            Theme::Light => Palette {
                text: Color::Black,
                dim: Color::Gray,
                correct: Color::Rgb(0, 128, 0),
                incorrect: Color::Rgb(200, 0, 0),
                accent: Color::Blue,
                background: Color::White,
            },
        }
    }
}

pub fn tier_color(tier: PerformanceTier) -> Color {
    match tier {
        PerformanceTier::Excellent => Color::Green,
        PerformanceTier::Good => Color::Cyan,
        PerformanceTier::Average => Color::Yellow,
        PerformanceTier::Beginner => Color::Red,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Draws the screen for the current app state, then the toast on top
pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);

    if let Some(toast) = &app.toast {
        let area = f.area();
        let width = (toast.message.width() as u16 + 4).min(area.width);
        let toast_area = Rect::new(area.x + area.width - width, area.y, width, 3.min(area.height));
        let style = Style::default().fg(severity_color(toast.severity));
        f.render_widget(Clear, toast_area);
        f.render_widget(
            Paragraph::new(Span::styled(toast.message.as_str(), style))
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            toast_area,
        );
    }
}

/// A rect of the given percentage size centred in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tester = &self.tester;
        let snapshot = tester.snapshot();
        let palette = Palette::for_theme(self.theme);

        // styles
        let base_style = Style::default().fg(palette.text).bg(palette.background);
        let bold_style = base_style.add_modifier(Modifier::BOLD);
        let dim_style = base_style.fg(palette.dim);
        let italic_style = dim_style.add_modifier(Modifier::ITALIC);
        let accent_style = base_style.fg(palette.accent);

        Block::default().style(base_style).render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // live stats
                Constraint::Length(1), // progress
                Constraint::Length(1), // padding
                Constraint::Min(3),    // passage or results
                Constraint::Length(1), // source
                Constraint::Length(CHART_HEIGHT),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let stats = tester.stats();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Tarix WPM", bold_style.fg(palette.accent)),
            Span::styled(
                format!(
                    "   Rekord: {} WPM   Testlar: {}   Oʻrtacha: {} WPM, {}%   Soʻzlar: {}",
                    stats.aggregate.best_wpm,
                    stats.aggregate.total_tests,
                    stats.average_wpm(),
                    stats.average_accuracy(),
                    stats.aggregate.total_words_typed,
                ),
                dim_style,
            ),
        ]));
        header.render(chunks[0], buf);

        let status = match snapshot.phase {
            Phase::Idle => Span::styled(
                "Boshlash uchun Space bosing",
                bold_style.fg(Color::Yellow),
            ),
            Phase::Paused => Span::styled("PAUZA", bold_style.fg(Color::Yellow)),
            Phase::Active => Span::styled("", base_style),
            Phase::Ended => Span::styled("Test yakunlandi", bold_style.fg(palette.correct)),
        };
        let live = Paragraph::new(Line::from(vec![
            Span::styled(format!("{}s", snapshot.remaining_secs), bold_style),
            Span::styled(
                format!(
                    "   {} WPM   {}% aniqlik   {} xato   {} belgi   ",
                    snapshot.live_wpm, snapshot.live_accuracy, snapshot.errors, snapshot.typed_chars
                ),
                base_style,
            ),
            status,
        ]))
        .alignment(Alignment::Center);
        live.render(chunks[1], buf);

        Gauge::default()
            .gauge_style(accent_style)
            .ratio(snapshot.progress.clamp(0.0, 1.0))
            .label(format!(
                "{}/{}s",
                snapshot.total_secs.saturating_sub(snapshot.remaining_secs),
                snapshot.total_secs
            ))
            .render(chunks[2], buf);

        match (snapshot.phase, tester.last_result()) {
            (Phase::Ended, Some(result)) => {
                let tier = PerformanceTier::for_wpm(result.wpm);
                let tier_style = bold_style.fg(tier_color(tier));
                let lines = vec![
                    Line::from(Span::styled(format!("{} WPM", result.wpm), tier_style)),
                    Line::from(Span::styled(
                        format!(
                            "{}% aniqlik   {} xato   {} s   {}/{}",
                            result.accuracy,
                            result.errors,
                            result.duration_secs,
                            result.language,
                            result.difficulty
                        ),
                        base_style,
                    )),
                    Line::from(Span::styled(tier.to_string(), tier_style)),
                    Line::from(Span::styled("Space: yangi test", italic_style)),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(chunks[4], buf);
            }
            _ => match snapshot.passage_text.as_deref() {
                Some(text) => {
                    let mut typed = tester.typed().chars();
                    let spans = text
                        .chars()
                        .enumerate()
                        .map(|(idx, expected)| {
                            let typed_char = typed.next();
                            let class = snapshot
                                .classes
                                .get(idx)
                                .copied()
                                .unwrap_or(CharClass::Untyped);
                            match class {
                                CharClass::Correct => {
                                    Span::styled(expected.to_string(), bold_style.fg(palette.correct))
                                }
                                CharClass::Incorrect => Span::styled(
                                    match typed_char.unwrap_or(expected) {
                                        ' ' => "·".to_owned(),
                                        c => c.to_string(),
                                    },
                                    bold_style.fg(palette.incorrect),
                                ),
                                CharClass::Untyped if idx == snapshot.cursor => Span::styled(
                                    expected.to_string(),
                                    dim_style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
                                ),
                                CharClass::Untyped => Span::styled(expected.to_string(), dim_style),
                            }
                        })
                        .collect::<Vec<Span>>();

                    Paragraph::new(Line::from(spans))
                        .wrap(Wrap { trim: false })
                        .render(chunks[4], buf);
                }
                None => {
                    Paragraph::new(Span::styled(
                        "Bu til va qiyinlik uchun matn yoʻq. F2 orqali boshqasini tanlang.",
                        bold_style.fg(Color::Yellow),
                    ))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[4], buf);
                }
            },
        }

        if let Some(text) = snapshot.passage_text.as_deref() {
            let mut label = format!(
                "{} soʻz   {} matn tugatildi",
                count_words(text),
                tester.passages_completed()
            );
            if let Some(source) = snapshot.passage_source.as_deref() {
                label = format!("{source}   {label}");
            }
            let source = Paragraph::new(Span::styled(label, italic_style))
            .alignment(Alignment::Right);
            source.render(chunks[5], buf);
        }

        render_chart(self, &snapshot.phase, palette, chunks[6], buf);

        let legend = Paragraph::new(Span::styled(
            "(space) boshlash / (esc) pauza / (tab) yangi matn / (^r) qayta / (f2) sozlamalar / (^l) reyting / (^t) tema / (^c) chiqish",
            italic_style,
        ))
        .wrap(Wrap { trim: true });
        legend.render(chunks[7], buf);
    }
}

/// Live samples while a session runs, otherwise the recent results
fn render_chart(app: &App, phase: &Phase, palette: Palette, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default()
        .fg(palette.text)
        .add_modifier(Modifier::BOLD);
    let running = matches!(phase, Phase::Active | Phase::Paused);

    let (points, title, x_title) = if running {
        let points = app
            .tester
            .live_samples()
            .map(|s| (s.elapsed_secs as f64, s.wpm as f64))
            .collect::<Vec<(f64, f64)>>();
        (points, "Joriy tezlik", "soniya")
    } else {
        let points = app
            .tester
            .stats()
            .recent_wpm()
            .iter()
            .enumerate()
            .map(|(i, wpm)| ((i + 1) as f64, *wpm as f64))
            .collect::<Vec<(f64, f64)>>();
        (points, "Oxirgi natijalar", "test")
    };

    let x_min = if running { 0.0 } else { 1.0 };
    let (x_max, y_max) = charting::compute_chart_params(&points, Some(x_min + 1.0));

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(palette.accent))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(title)
                .border_style(Style::default().fg(palette.dim)),
        )
        .x_axis(
            Axis::default()
                .title(x_title)
                .style(Style::default().fg(palette.dim))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::styled(charting::format_label(x_min), bold_style),
                    Span::styled(charting::format_label(x_max), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .style(Style::default().fg(palette.dim))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(y_max), bold_style),
                ]),
        );

    chart.render(area, buf);
}

/// Settings panel drawn over the typing screen
pub fn render_settings_panel(app: &App, f: &mut Frame) {
    let area = centered_rect(60, 50, f.area());
    let palette = Palette::for_theme(app.theme);
    let base_style = Style::default().fg(palette.text).bg(palette.background);
    let on_off = |flag: bool| if flag { "yoqilgan" } else { "oʻchirilgan" };
    let empty_mark = if app
        .tester
        .has_passages(app.draft.language, app.draft.difficulty)
    {
        ""
    } else {
        " (matn yoʻq)"
    };

    let rows = [
        format!("Test vaqti: {} s", app.draft.test_duration_secs),
        format!("Qiyinlik: {}{empty_mark}", app.draft.difficulty),
        format!("Til: {}", app.draft.language.label()),
        format!("Backspace: {}", on_off(app.draft.allow_backspace)),
        format!("Ovoz: {}", on_off(app.draft.sound_enabled)),
    ];

    let mut lines = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == app.settings_row {
                base_style.add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                base_style
            };
            Line::from(Span::styled(row.clone(), style))
        })
        .collect::<Vec<Line>>();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑/↓ tanlash   ←/→ oʻzgartirish   Enter saqlash   Esc bekor",
        base_style.fg(palette.dim).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(base_style).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Sozlamalar")
                .border_style(Style::default().fg(palette.accent)),
        ),
        area,
    );
}

/// Modal with a title and plain lines, closed by any key
pub fn render_modal(app: &App, title: &str, body: &[String], f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    let palette = Palette::for_theme(app.theme);
    let base_style = Style::default().fg(palette.text).bg(palette.background);

    let mut lines = body
        .iter()
        .map(|l| Line::from(Span::styled(l.as_str(), base_style)))
        .collect::<Vec<Line>>();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Yopish uchun istalgan tugmani bosing",
        base_style.fg(palette.dim).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(base_style).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(palette.accent)),
        ),
        area,
    );
}
