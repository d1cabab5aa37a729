//! Page layout and hit-testing
//!
//! The layout is computed once per frame from the page state and kept by the
//! app, so mouse events are resolved against exactly what was drawn. Panels
//! are tested before pills because they are drawn on top.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::disclosure::{Hit, PresentationMode};
use crate::page::AskPage;
use crate::widget::FragmentView;

/// Rows reserved for the page header
pub const HEADER_HEIGHT: u16 = 1;
/// Rows of the chat bar, borders included
pub const CHAT_BAR_HEIGHT: u16 = 3;

/// Text drawn for a pill in the given mode
pub fn pill_label(value: &str, mode: PresentationMode) -> String {
    match mode {
        PresentationMode::Inline => value.to_string(),
        PresentationMode::Popup => format!(" {} ▼ ", value),
    }
}

/// A fragment placed on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacedKind {
    Literal(String),
    Pill { key: String, value: String, open: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub area: Rect,
    pub kind: PlacedKind,
}

/// An open option panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    pub key: String,
    pub area: Rect,
    /// Current value of the slot, highlighted in the panel
    pub selected: String,
    /// One row per visible option
    pub options: Vec<(String, Rect)>,
}

/// One template card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub widget: usize,
    pub title: String,
    pub area: Rect,
    pub items: Vec<Placed>,
    pub panel: Option<PanelLayout>,
}

/// What the pointer is over: a widget's pill or panel, possibly an option row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHit {
    pub widget: usize,
    pub hit: Hit,
    pub option: Option<String>,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub mode: PresentationMode,
    pub header: Rect,
    pub cards: Vec<CardLayout>,
    pub chat_bar: Rect,
    pub answer: Rect,
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Relative placement of fragments inside a card of inner width `width`
///
/// Fragments wrap to the next line as a whole; a fragment wider than a line
/// is clipped. Returns the placements and the number of lines used.
fn place_fragments(
    view: &[FragmentView<'_>],
    mode: PresentationMode,
    width: u16,
) -> (Vec<(u16, u16, u16, PlacedKind)>, u16) {
    let mut placed = Vec::with_capacity(view.len());
    let (mut x, mut y) = (0u16, 0u16);

    for fragment in view {
        let (text_width, kind) = match fragment {
            FragmentView::Literal(text) => (text.width(), PlacedKind::Literal(text.to_string())),
            FragmentView::Slot(slot) => (
                pill_label(slot.value, mode).width(),
                PlacedKind::Pill {
                    key: slot.key.to_string(),
                    value: slot.value.to_string(),
                    open: slot.open,
                },
            ),
        };
        let text_width = u16::try_from(text_width).unwrap_or(u16::MAX);
        if x > 0 && x.saturating_add(text_width) > width {
            x = 0;
            y += 1;
        }
        let visible = text_width.min(width.saturating_sub(x));
        placed.push((x, y, visible, kind));
        x = x.saturating_add(text_width);
    }

    (placed, y + 1)
}

fn place_panel(pill: Rect, key: &str, selected: &str, options: &[String], bounds: Rect) -> PanelLayout {
    let widest = options.iter().map(|o| o.width()).max().unwrap_or(0);
    // borders + "▶ " marker
    let width = u16::try_from(widest + 4)
        .unwrap_or(u16::MAX)
        .max(pill.width)
        .min(bounds.width);
    let wanted = u16::try_from(options.len() + 2).unwrap_or(u16::MAX);

    let x = pill.x.min(bounds.right().saturating_sub(width));
    let below = pill.bottom();
    let room_below = bounds.bottom().saturating_sub(below);
    let room_above = pill.y.saturating_sub(bounds.y);
    let (y, height) = if wanted <= room_below || room_below >= room_above {
        (below, wanted.min(room_below))
    } else {
        let height = wanted.min(room_above);
        (pill.y - height, height)
    };

    let area = Rect::new(x, y, width, height);
    let rows = height.saturating_sub(2) as usize;
    let options = options
        .iter()
        .take(rows)
        .enumerate()
        .map(|(i, option)| {
            (
                option.clone(),
                Rect::new(x + 1, y + 1 + i as u16, width.saturating_sub(2), 1),
            )
        })
        .collect();

    PanelLayout {
        key: key.to_string(),
        area,
        selected: selected.to_string(),
        options,
    }
}

impl PageLayout {
    /// Lay out the page inside `area`
    pub fn compute(page: &AskPage, area: Rect) -> Self {
        let mode = page.mode();
        let inner_width = area.width.saturating_sub(2);
        let header = Rect::new(area.x, area.y, area.width, HEADER_HEIGHT.min(area.height));

        let mut cards = Vec::with_capacity(page.widgets().len());
        let mut y = header.bottom();
        for (index, widget) in page.widgets().iter().enumerate() {
            let view = widget.view();
            let (placed, lines) = place_fragments(&view, mode, inner_width);
            let card_area = Rect::new(area.x, y, area.width, lines + 2).intersection(area);
            let origin_x = card_area.x + 1;
            let origin_y = card_area.y + 1;

            let items: Vec<Placed> = placed
                .into_iter()
                .map(|(dx, dy, width, kind)| Placed {
                    area: Rect::new(origin_x + dx, origin_y + dy, width, 1).intersection(area),
                    kind,
                })
                .collect();

            cards.push(CardLayout {
                widget: index,
                title: widget.template().label(),
                area: card_area,
                items,
                panel: None,
            });
            y = card_area.bottom();
        }

        let chat_bar = Rect::new(area.x, y, area.width, CHAT_BAR_HEIGHT).intersection(area);
        let answer = Rect::new(
            area.x,
            chat_bar.bottom(),
            area.width,
            area.bottom().saturating_sub(chat_bar.bottom()),
        );

        // Panels overlay everything below their pill, so place them last.
        for (card, widget) in cards.iter_mut().zip(page.widgets()) {
            let open = card.items.iter().find_map(|item| match &item.kind {
                PlacedKind::Pill { key, value, open: true } => Some((item.area, key, value)),
                _ => None,
            });
            if let Some((pill, key, value)) = open {
                if let Some(slot) = widget.template().slot(key) {
                    card.panel = Some(place_panel(pill, key, value, slot.options(), area));
                }
            }
        }

        Self {
            mode,
            header,
            cards,
            chat_bar,
            answer,
        }
    }

    /// What lies under `(column, row)`
    pub fn hit_test(&self, column: u16, row: u16) -> Option<PageHit> {
        for card in self.cards.iter().rev() {
            let Some(panel) = &card.panel else {
                continue;
            };
            if contains(panel.area, column, row) {
                let option = panel
                    .options
                    .iter()
                    .find(|(_, rect)| contains(*rect, column, row))
                    .map(|(option, _)| option.clone());
                return Some(PageHit {
                    widget: card.widget,
                    hit: Hit::panel(panel.key.clone()),
                    option,
                });
            }
        }

        self.cards.iter().find_map(|card| {
            card.items.iter().find_map(|item| match &item.kind {
                PlacedKind::Pill { key, .. } if contains(item.area, column, row) => Some(PageHit {
                    widget: card.widget,
                    hit: Hit::pill(key.clone()),
                    option: None,
                }),
                _ => None,
            })
        })
    }

    /// Screen area of a widget's pill, for tests and keyboard focus
    pub fn pill_area(&self, widget: usize, key: &str) -> Option<Rect> {
        self.cards.get(widget)?.items.iter().find_map(|item| match &item.kind {
            PlacedKind::Pill { key: k, .. } if k == key => Some(item.area),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateDef;
    use std::time::{Duration, Instant};

    fn page(mode: PresentationMode) -> AskPage {
        let template = TemplateDef::new()
            .text("Top ")
            .slot("metric", ["Net Revenue", "Volume"])
            .text(" drivers?")
            .validate()
            .unwrap();
        AskPage::new(vec![template], mode, Duration::from_millis(140))
    }

    #[test]
    fn test_fragments_placed_left_to_right() {
        let layout = PageLayout::compute(&page(PresentationMode::Inline), Rect::new(0, 0, 60, 20));
        let card = &layout.cards[0];
        assert_eq!(card.area, Rect::new(0, 1, 60, 3));
        assert_eq!(card.items[0].area, Rect::new(1, 2, 4, 1));
        assert_eq!(card.items[1].area, Rect::new(5, 2, 11, 1));
        assert_eq!(card.items[2].area.x, 16);
        assert_eq!(layout.chat_bar, Rect::new(0, 4, 60, 3));
    }

    #[test]
    fn test_popup_pill_is_wider() {
        let layout = PageLayout::compute(&page(PresentationMode::Popup), Rect::new(0, 0, 60, 20));
        let pill = layout.pill_area(0, "metric").unwrap();
        assert_eq!(pill.width, pill_label("Net Revenue", PresentationMode::Popup).width() as u16);
    }

    #[test]
    fn test_fragments_wrap_on_narrow_screens() {
        let layout = PageLayout::compute(&page(PresentationMode::Inline), Rect::new(0, 0, 18, 20));
        let card = &layout.cards[0];
        // "Top " + "Net Revenue" fit in 16 columns, " drivers?" wraps
        assert_eq!(card.items[2].area.y, card.items[0].area.y + 1);
        assert_eq!(card.area.height, 4);
    }

    #[test]
    fn test_hit_test_pill_and_outside() {
        let layout = PageLayout::compute(&page(PresentationMode::Popup), Rect::new(0, 0, 60, 20));
        let pill = layout.pill_area(0, "metric").unwrap();
        let hit = layout.hit_test(pill.x, pill.y).unwrap();
        assert_eq!(hit.hit, Hit::pill("metric"));
        assert_eq!(hit.widget, 0);
        assert_eq!(layout.hit_test(1, 2), None);
    }

    #[test]
    fn test_open_panel_rows_hit_options() {
        let mut page = page(PresentationMode::Popup);
        let area = Rect::new(0, 0, 60, 20);
        let pill = PageLayout::compute(&page, area).pill_area(0, "metric").unwrap();
        page.widget_mut(0)
            .unwrap()
            .handle(
                crate::widget::Gesture::Press(Some(Hit::pill("metric"))),
                Instant::now(),
            )
            .unwrap();

        let layout = PageLayout::compute(&page, area);
        let panel = layout.cards[0].panel.as_ref().unwrap();
        assert_eq!(panel.area.y, pill.bottom());
        assert_eq!(panel.options.len(), 2);

        let (_, volume_row) = &panel.options[1];
        let hit = layout.hit_test(volume_row.x, volume_row.y).unwrap();
        assert_eq!(hit.hit, Hit::panel("metric"));
        assert_eq!(hit.option.as_deref(), Some("Volume"));

        // border of the panel is still the panel, but no option
        let border = layout.hit_test(panel.area.x, panel.area.y).unwrap();
        assert_eq!(border.option, None);
    }

    #[test]
    fn test_panel_flips_above_when_no_room_below() {
        let pill = Rect::new(10, 8, 6, 1);
        let options = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let panel = place_panel(pill, "k", "A", &options, Rect::new(0, 0, 40, 10));
        assert_eq!(panel.area, Rect::new(10, 3, 6, 5));
        assert_eq!(panel.options.len(), 3);
    }
}
