//! Frame Rendering
//!
//! Draws a [`DisplayState`] into a ratatui frame. Reads nothing else, so a
//! frame can be rendered against `TestBackend` in tests.
//!
//! ```text
//! ┌ emergency banner (only while active) ┐
//! │ conversation (scrollable)            │
//! │ error line (only after a failure)    │
//! │ quick actions                        │
//! │ input                                │
//! │ status bar                           │
//! ```

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use buddy_conductor::QUICK_ACTIONS;

use crate::display::{
    banner_headline, citation_lines, citation_summary, status_text, DisplayMessage, DisplayRole,
    DisplayState, ServiceHealth, BUDDY_NAME, EMERGENCY_ADVISORY,
};
use crate::markup::{self, Inline, MarkupBlock};
use crate::theme;

/// Input box height including borders
pub const INPUT_HEIGHT: u16 = 4;

/// Banner height including borders
const BANNER_HEIGHT: u16 = 4;

/// Indent for assistant body text
const BODY_INDENT: &str = "  ";

/// Draw one frame; returns the number of conversation lines
pub fn draw(frame: &mut Frame, state: &DisplayState) -> usize {
    let banner_height = if state.banner.is_some() { BANNER_HEIGHT } else { 0 };
    let error_height = u16::from(state.last_error.is_some());

    let [banner, conversation, error, quick, input, status] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(3),
        Constraint::Length(error_height),
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_banner(frame, banner, state);
    let total_lines = render_conversation(frame, conversation, state);
    render_error(frame, error, state);
    render_quick_actions(frame, quick, state);
    render_input(frame, input, state);
    render_status(frame, status, state);

    total_lines
}

fn render_banner(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let Some(ref banner) = state.banner else {
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            banner_headline(&banner.emergency_number),
            theme::banner_headline(),
        )),
        Line::from(Span::styled(
            EMERGENCY_ADVISORY,
            Style::default().fg(theme::EMERGENCY_SOFT),
        )),
    ];
    let block = Block::bordered().border_style(Style::default().fg(theme::EMERGENCY_RED));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_conversation(frame: &mut Frame, area: Rect, state: &DisplayState) -> usize {
    let width = area.width.saturating_sub(1) as usize;
    let height = area.height as usize;
    if width < 10 || height == 0 {
        return 0;
    }

    let mut lines = conversation_lines(state, width);
    let total_lines = lines.len();

    // Clamp scroll offset
    let max_scroll = total_lines.saturating_sub(height);
    let scroll_offset = state.scroll_offset.min(max_scroll);

    // Calculate visible range
    let visible_end = total_lines.saturating_sub(scroll_offset);
    let visible_start = visible_end.saturating_sub(height);
    let has_content_above = visible_start > 0;
    let has_content_below = scroll_offset > 0;

    let mut visible: Vec<Line<'static>> = lines.drain(visible_start..visible_end).collect();

    // Fade the edges that have more content beyond them
    if has_content_above {
        for line in visible.iter_mut().take(2) {
            fade(line);
        }
    }
    if has_content_below {
        for line in visible.iter_mut().rev().take(2) {
            fade(line);
        }
    }

    frame.render_widget(Paragraph::new(visible), area);
    total_lines
}

fn fade(line: &mut Line<'_>) {
    for span in &mut line.spans {
        span.style = span.style.fg(theme::FADE_GRAY);
    }
}

/// Every conversation line for a given width, top to bottom
pub fn conversation_lines(state: &DisplayState, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if state.messages.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{BUDDY_NAME}: describe what happened, or pick a quick action (F1-F6)."),
            Style::default().fg(theme::BUDDY_ORANGE),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "In a life-threatening emergency call {} first.",
                state.region.emergency_number()
            ),
            Style::default().fg(theme::DIM_GRAY),
        )));
    }

    for message in &state.messages {
        match message.role {
            DisplayRole::User => push_user_message(&mut lines, message, width),
            DisplayRole::Assistant => {
                push_assistant_message(&mut lines, message, width, state.show_sources);
            }
        }
        lines.push(Line::default());
    }

    if !state.input_enabled() {
        lines.push(Line::from(Span::styled(
            format!("{BUDDY_NAME} is thinking..."),
            Style::default()
                .fg(theme::THINKING_YELLOW)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn push_user_message(lines: &mut Vec<Line<'static>>, message: &DisplayMessage, width: usize) {
    let style = Style::default().fg(theme::USER_BLUE);
    let content = format!("{}{}", DisplayRole::User.prefix(), message.content);
    for line in textwrap::wrap(&content, width) {
        lines.push(Line::from(Span::styled(line.into_owned(), style)));
    }
}

fn push_assistant_message(
    lines: &mut Vec<Line<'static>>,
    message: &DisplayMessage,
    width: usize,
    show_sources: bool,
) {
    let mut header = vec![Span::styled(
        DisplayRole::Assistant.prefix().trim_end().to_string(),
        Style::default()
            .fg(theme::BUDDY_ORANGE)
            .add_modifier(Modifier::BOLD),
    )];
    if message.is_emergency {
        header.push(Span::styled(
            " ⚠ emergency",
            Style::default().fg(theme::EMERGENCY_RED),
        ));
    }
    lines.push(Line::from(header));

    let body = Style::default().fg(theme::TEXT_PRIMARY);
    for block in markup::parse(&message.content) {
        match block {
            MarkupBlock::Paragraph(runs) => {
                lines.extend(wrap_runs(&runs, body, width, BODY_INDENT, BODY_INDENT));
            }
            MarkupBlock::ListItem(runs) => {
                lines.extend(wrap_runs(&runs, body, width, "  • ", "    "));
            }
            MarkupBlock::Break => lines.push(Line::default()),
        }
    }

    let Some(summary) = citation_summary(message.citations.len()) else {
        return;
    };
    let dim = Style::default().fg(theme::DIM_GRAY);
    let toggle = if show_sources { "▾" } else { "▸" };
    lines.push(Line::from(Span::styled(
        format!("{BODY_INDENT}{toggle} {summary} (F8)"),
        dim,
    )));
    if show_sources {
        for source_line in citation_lines(&message.citations) {
            let options = textwrap::Options::new(width)
                .initial_indent("    ")
                .subsequent_indent("       ");
            for line in textwrap::wrap(&source_line, options) {
                lines.push(Line::from(Span::styled(line.into_owned(), dim)));
            }
        }
    }
}

/// A word with its style, and whether whitespace preceded it
struct Word {
    text: String,
    style: Style,
    space_before: bool,
}

fn split_words(runs: &[Inline], body: Style) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for run in runs {
        let style = match run {
            Inline::Text(_) => body,
            Inline::Emphasis(_) => theme::emphasis(),
        };
        let mut current = String::new();
        for c in run.text().chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        style,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                // No pending space glues this word to the previous run
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(Word {
                text: current,
                style,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    words
}

/// Greedy word wrap over styled runs
fn wrap_runs(
    runs: &[Inline],
    body: Style,
    width: usize,
    first_prefix: &'static str,
    rest_prefix: &'static str,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = vec![Span::styled(first_prefix, body)];
    let mut line_width = first_prefix.width();
    let mut line_has_words = false;

    for word in split_words(runs, body) {
        let word_width = word.text.width();
        let gap = usize::from(line_has_words && word.space_before);

        if line_has_words && line_width + gap + word_width > width {
            lines.push(Line::from(std::mem::take(&mut spans)));
            spans.push(Span::styled(rest_prefix, body));
            line_width = rest_prefix.width();
            line_has_words = false;
        } else if gap == 1 {
            spans.push(Span::styled(" ", body));
            line_width += 1;
        }

        line_width += word_width;
        spans.push(Span::styled(word.text, word.style));
        line_has_words = true;
    }

    if line_has_words {
        lines.push(Line::from(spans));
    }
    lines
}

fn render_error(frame: &mut Frame, area: Rect, state: &DisplayState) {
    if let Some(ref error) = state.last_error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("✖ {error}"),
                Style::default().fg(theme::ERROR_RED),
            )),
            area,
        );
    }
}

fn render_quick_actions(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let style = if state.input_enabled() {
        Style::default().fg(theme::TEXT_PRIMARY)
    } else {
        Style::default().fg(theme::DIM_GRAY)
    };
    let key_style = style.add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", style));
        }
        spans.push(Span::styled(format!("F{}", i + 1), key_style));
        spans.push(Span::styled(format!(" {} {}", action.icon, action.text), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let enabled = state.input_enabled();
    let border = if enabled {
        theme::USER_BLUE
    } else {
        theme::DIM_GRAY
    };
    let block = Block::bordered()
        .title(" Describe the situation ")
        .border_style(Style::default().fg(border));

    let text_width = area.width.saturating_sub(2) as usize;
    let text_height = area.height.saturating_sub(2) as usize;
    if text_width < 5 || text_height == 0 {
        frame.render_widget(block, area);
        return;
    }

    let lines: Vec<Line<'static>> = if enabled {
        let full_input = format!("{}_", state.input);
        let wrapped: Vec<String> = textwrap::wrap(&full_input, text_width)
            .into_iter()
            .map(std::borrow::Cow::into_owned)
            .collect();
        let skip = wrapped.len().saturating_sub(text_height);
        wrapped
            .into_iter()
            .skip(skip)
            .map(|l| Line::from(Span::styled(l, Style::default().fg(theme::USER_BLUE))))
            .collect()
    } else {
        vec![Line::from(Span::styled(
            format!("Waiting for {BUDDY_NAME}..."),
            Style::default()
                .fg(theme::DIM_GRAY)
                .add_modifier(Modifier::ITALIC),
        ))]
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let color = match (state.input_enabled(), state.health) {
        (false, _) => theme::THINKING_YELLOW,
        (true, ServiceHealth::Online) => theme::SUCCESS_GREEN,
        (true, ServiceHealth::Offline) => theme::ERROR_RED,
        (true, ServiceHealth::Unknown) => theme::DIM_GRAY,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(status_text(state), Style::default().fg(color))),
        area,
    );
}
