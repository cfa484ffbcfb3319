use ratatui::Frame;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::constants::SHADOW_MARGIN;
use crate::geometry::{Point, Rect, Size};
use crate::state::HostState;
use crate::window::{WidgetId, WidgetManager};

use super::compositor::{Compositor, Surface};
use super::theme::{Palette, blend, palette, to_color};

pub const KEY_HINTS: &str = "1-6 add  c click-through  p pin  b bottom  x close  X close all  \
                             u unlock all  s snap  +/- threshold  [/] opacity  l theme  Tab focus  q quit";

/// Paint the desktop, every surface in stack order, then the status bar.
pub fn draw(
    frame: &mut Frame<'_>,
    manager: &WidgetManager,
    compositor: &Compositor,
    state: &HostState,
) {
    let area = frame.area();
    let colors = palette(manager.settings().light_mode);
    let desktop = CellRect {
        height: area.height.saturating_sub(1),
        ..area
    };
    frame.render_widget(
        Block::new().style(Style::new().bg(to_color(colors.desktop))),
        desktop,
    );

    for id in compositor.draw_order() {
        if let Some(surface) = compositor.surface(&id) {
            draw_card(frame, manager, compositor, state, &id, surface, &colors);
        }
    }

    if area.height > 0 {
        let bar = CellRect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        draw_status_bar(frame, manager, state, bar, &colors);
    }
}

fn draw_card(
    frame: &mut Frame<'_>,
    manager: &WidgetManager,
    compositor: &Compositor,
    state: &HostState,
    id: &WidgetId,
    surface: &Surface,
    colors: &Palette,
) {
    let Some(widget) = manager.registry().get(id) else {
        return;
    };
    let Some(cells) = compositor.to_cells(surface.frame.inset(SHADOW_MARGIN)) else {
        return;
    };
    let focused = state.focused() == Some(id);
    let bg = blend(colors.card_bg, colors.desktop, surface.opacity);
    let fg = blend(colors.card_fg, colors.desktop, surface.opacity);
    let border = if focused { colors.focus } else { colors.border };

    let mut title = format!(" {} ", widget.display_name());
    if surface.pinned {
        title.push_str("[pin] ");
    }
    if surface.click_through {
        title.push_str("[ct] ");
    }
    let mut border_style = Style::new().fg(to_color(blend(border, colors.desktop, surface.opacity)));
    if surface.click_through {
        border_style = border_style.add_modifier(Modifier::DIM);
    }
    let block = Block::bordered()
        .title(title)
        .border_style(border_style)
        .style(Style::new().bg(to_color(bg)).fg(to_color(fg)));
    let inner = block.inner(cells);
    frame.render_widget(Clear, cells);
    frame.render_widget(block, cells);

    if let Some(renderer) = manager.renderer(id) {
        let lines: Vec<Line> = renderer.content_lines().into_iter().map(Line::from).collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    let Some(overlay) = manager.paint_overlay(id) else {
        return;
    };
    let origin = surface.frame.origin();
    if let Some(strip) = overlay.indicator {
        let strip = Rect::new(origin.x + strip.x, origin.y + strip.y, strip.width, strip.height);
        if let Some(strip_cells) = compositor.to_cells(strip) {
            frame.render_widget(
                Block::new().style(Style::new().bg(to_color(colors.indicator))),
                strip_cells,
            );
        }
    }

    // The grip's right-angle corner sits just inside the card corner.
    let corner = overlay.grip[0];
    let grip_at = Point::new(origin.x + corner.x - 1, origin.y + corner.y - 1);
    if let Some(grip_cell) = compositor.to_cells(Rect::from_parts(grip_at, Size::new(1, 1)))
        && let Some(cell) = frame
            .buffer_mut()
            .cell_mut((grip_cell.x, grip_cell.y))
    {
        let grip = if overlay.hover_resize {
            colors.focus
        } else {
            colors.border
        };
        cell.set_symbol("◢");
        cell.set_fg(to_color(grip));
    }
}

fn draw_status_bar(
    frame: &mut Frame<'_>,
    manager: &WidgetManager,
    state: &HostState,
    bar: CellRect,
    colors: &Palette,
) {
    let settings = manager.settings();
    let snap = if settings.snap_enabled {
        format!("snap {}px", settings.snap_threshold)
    } else {
        "snap off".to_string()
    };
    let summary = format!(
        "{} widgets | {} | opacity {:.0}% | {}",
        manager.registry().len(),
        snap,
        settings.widget_opacity * 100.0,
        if settings.light_mode { "light" } else { "dark" },
    );
    let left = if state.status().is_empty() {
        KEY_HINTS
    } else {
        state.status()
    };
    let text = format!(" {summary} | {left}");
    frame.render_widget(
        Paragraph::new(text).style(
            Style::new()
                .bg(to_color(colors.status_bg))
                .fg(to_color(colors.status_fg)),
        ),
        bar,
    );
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::host::{CellScale, TermDesktop};
    use crate::persistence::LayoutPersistence;
    use crate::renderer::{BasicRendererFactory, RendererState};
    use crate::window::{SizeClass, WidgetKind};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn draws_card_title_grip_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let compositor = Rc::new(RefCell::new(Compositor::new(CellScale::default())));
        compositor.borrow_mut().set_grid(80, 23);
        let mut manager = WidgetManager::new(
            Box::new(TermDesktop::new(Rc::clone(&compositor))),
            Box::new(BasicRendererFactory),
            LayoutPersistence::new(dir.path().join("config.json")),
        );
        let id = manager
            .add_widget(RendererState::empty(WidgetKind::Notes), SizeClass::Medium)
            .unwrap();
        let mut state = HostState::new();
        state.set_focus(Some(id.clone()));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &manager, &compositor.borrow(), &state))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Notes"));
        assert!(text.contains("(empty note)"));
        assert!(text.contains("◢"));
        assert!(text.contains("1 widgets | snap 20px"));
    }
}
