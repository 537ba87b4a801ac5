use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Areas of the query log screen
pub struct ScreenAreas {
    pub header: Rect,
    pub banner: Option<Rect>,
    pub filters: Rect,
    pub table: Rect,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, optional warning banner, filter bar, table and status bar
    pub fn query_log(area: Rect, show_banner: bool) -> ScreenAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_banner {
            constraints.push(Constraint::Length(3)); // Banner
        }
        constraints.push(Constraint::Length(3)); // Filter bar
        constraints.push(Constraint::Min(1)); // Table
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut idx = 0;
        let header = chunks[idx];
        idx += 1;
        let banner = if show_banner {
            idx += 1;
            Some(chunks[idx - 1])
        } else {
            None
        };

        ScreenAreas {
            header,
            banner,
            filters: chunks[idx],
            table: chunks[idx + 1],
            status: chunks[idx + 2],
        }
    }

    /// A popup of at most `width` x `height` centered in `area`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_takes_space_only_when_shown() {
        let area = Rect::new(0, 0, 80, 24);

        let areas = Layout::query_log(area, false);
        assert!(areas.banner.is_none());
        assert_eq!(areas.table.height, 24 - 3 - 3 - 1);

        let areas = Layout::query_log(area, true);
        assert_eq!(areas.banner.map(|r| r.height), Some(3));
        assert_eq!(areas.table.height, 24 - 3 - 3 - 3 - 1);
        assert_eq!(areas.status.y, 23);
    }

    #[test]
    fn test_centered_fits_small_areas() {
        let popup = Layout::centered(Rect::new(0, 0, 20, 6), 50, 10);
        assert!(popup.width <= 16);
        assert!(popup.height <= 4);
    }
}
