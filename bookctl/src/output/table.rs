use tabled::{Table, settings::Style};

/// The look that every table printed by bookctl shares
pub(crate) trait BookctlTable {
    fn styled(&mut self) -> &mut Self;
}

impl BookctlTable for Table {
    fn styled(&mut self) -> &mut Self {
        self.with(Style::rounded())
    }
}
