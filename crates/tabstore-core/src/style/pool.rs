//! Per-sheet style table

use ahash::AHashMap;

use super::Style;

/// Distinct styles of one sheet, in first-use order
///
/// Slot 0 holds the default style. Cells keep slot numbers, and inserting
/// a style that is already present hands back its existing slot.
#[derive(Debug, Clone)]
pub struct StylePool {
    styles: Vec<Style>,
    slots: AHashMap<Style, u32>,
}

impl Default for StylePool {
    fn default() -> Self {
        let mut pool = StylePool {
            styles: Vec::new(),
            slots: AHashMap::default(),
        };
        pool.get_or_insert(Style::default());
        pool
    }
}

impl StylePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of `style`, added at the end when unseen
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        match self.slots.get(&style) {
            Some(&slot) => slot,
            None => {
                let slot = self.styles.len() as u32;
                self.styles.push(style.clone());
                self.slots.insert(style, slot);
                slot
            }
        }
    }

    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    pub fn default_style(&self) -> &Style {
        &self.styles[0]
    }

    /// Slot count, default included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True while only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Styles with their slots, slot 0 first
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        (0u32..).zip(&self.styles)
    }
}
