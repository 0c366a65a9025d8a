//! Caret, bit lane, mark and tagged selections over a paged source.
//!
//! Every caret move goes through two phases. [`NavigationModel::propose_caret`]
//! validates a target without touching anything, and a rejected proposal
//! leaves the model exactly as it was. [`NavigationModel::commit`] then
//! applies it in a fixed order: the caret moves, the viewport pages to keep
//! it visible, the mark is synchronized, and finally the inspector panels
//! are recomputed from the page that is now loaded.

use tracing::instrument;

use crate::config;
use crate::model::addr;
use crate::model::inspector;
use crate::model::selection;
use crate::model::space;
use crate::model::viewport;

pub mod command;

pub use command::Command;

#[derive(Debug)]
pub enum NavigationError {
    /// The caret would land past the last byte of the source.
    OutOfBounds {
        proposed: u64,
        limit: u64,
    },
    /// A relative move would go below address 0.
    Underflow,
    NoSource,
    /// Confirming a selection needs a mark.
    NoMark,
    /// Paging failed. The caret was still committed; the previous page is
    /// kept and paging is retried on the next command.
    Source(space::SourceError),
}

/// A validated caret move, consumed by [`NavigationModel::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Proposal {
    origin: u64,
    target: u64,
}

impl Proposal {
    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn target(&self) -> u64 {
        self.target
    }
}

/// What a successful command changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRecord {
    pub from: addr::Address,
    pub to: addr::Address,
    /// Whether a new page was loaded.
    pub paged: bool,
}

#[derive(Debug)]
pub struct NavigationModel {
    viewport: viewport::Viewport,

    caret: u64,
    mark: Option<u64>,
    selecting: bool,
    tags: imbl::Vector<selection::Selection>,

    panels: inspector::Panels,

    live_selection_color: config::Color,
    tag_color: config::Color,
}

impl NavigationModel {
    pub fn new(config: &config::Config) -> NavigationModel {
        NavigationModel {
            viewport: viewport::Viewport::new(config.cols, config.rows),

            caret: 0,
            mark: None,
            selecting: false,
            tags: imbl::Vector::new(),

            panels: inspector::Panels::default(),

            live_selection_color: config.live_selection_color,
            tag_color: config.tag_color,
        }
    }

    /// Starts a new session on `source`. Caret, lane, mark, tags and page
    /// offset are all reset. If the first page can't be read the source
    /// stays attached and the error is returned.
    pub fn attach(&mut self, source: space::PagedSource) -> Result<(), NavigationError> {
        self.reset();
        let result = self.viewport.attach(source);
        self.refresh();
        result.map_err(NavigationError::Source)
    }

    pub fn detach(&mut self) -> Option<space::PagedSource> {
        self.reset();
        let source = self.viewport.detach();
        self.refresh();
        source
    }

    fn reset(&mut self) {
        self.caret = 0;
        self.mark = None;
        self.selecting = false;
        self.tags = imbl::Vector::new();
    }

    pub fn caret(&self) -> u64 {
        self.caret
    }

    pub fn lane(&self) -> u8 {
        self.viewport.lane()
    }

    /// Caret and lane as a single bit address.
    pub fn address(&self) -> addr::Address {
        addr::Address::new(self.caret, self.viewport.lane())
    }

    pub fn mark(&self) -> Option<u64> {
        self.mark
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn limit(&self) -> u64 {
        self.viewport.limit()
    }

    pub fn viewport(&self) -> &viewport::Viewport {
        &self.viewport
    }

    pub fn panels(&self) -> &inspector::Panels {
        &self.panels
    }

    /// Confirmed selections, oldest first. Cloning the vector is cheap and
    /// the clone is unaffected by later commands.
    pub fn selections(&self) -> &imbl::Vector<selection::Selection> {
        &self.tags
    }

    /// The range between mark and caret, if there is a mark.
    pub fn live_selection(&self) -> Option<selection::Selection> {
        self.mark.map(|mark| selection::Selection::new(mark, self.caret, self.live_selection_color))
    }

    /// Validates moving the caret to `target`. Nothing changes either way.
    pub fn propose_caret(&self, target: u64) -> Result<Proposal, NavigationError> {
        if self.viewport.source().is_none() {
            return Err(NavigationError::NoSource);
        }

        if target > self.viewport.limit() {
            return Err(NavigationError::OutOfBounds { proposed: target, limit: self.viewport.limit() });
        }

        Ok(Proposal { origin: self.caret, target })
    }

    fn propose_offset(&self, delta: i64) -> Result<Proposal, NavigationError> {
        match self.caret.checked_add_signed(delta) {
            Some(target) => self.propose_caret(target),
            None if delta < 0 => Err(NavigationError::Underflow),
            None => Err(NavigationError::OutOfBounds { proposed: u64::MAX, limit: self.viewport.limit() }),
        }
    }

    /// Applies a proposal. It is checked again first, so a proposal made
    /// before the source changed can't move the caret out of bounds.
    #[instrument(level = "debug", skip(self))]
    pub fn commit(&mut self, proposal: Proposal) -> Result<ChangeRecord, NavigationError> {
        let proposal = self.propose_caret(proposal.target)?;
        let from = self.address();

        self.caret = proposal.target;
        let paged = self.viewport.follow(self.caret);
        if !self.selecting {
            self.mark = Some(self.caret);
        }
        self.refresh();

        match paged {
            Ok(paged) => Ok(ChangeRecord { from, to: self.address(), paged }),
            Err(e) => Err(NavigationError::Source(e)),
        }
    }

    fn refresh(&mut self) {
        let lane = self.viewport.lane();

        self.panels = if self.viewport.contains(self.caret) {
            let index = (self.caret - self.viewport.offset()) as usize;
            inspector::inspect(self.viewport.cursor_mut(), index, lane)
        } else {
            inspector::Panels::default()
        };
    }

    /// Moves the bit lane by `delta`. Crossing a byte boundary moves the
    /// caret too, and if that caret move is rejected the lane stays put.
    pub fn shift_lane(&mut self, delta: i8) -> Result<ChangeRecord, NavigationError> {
        if self.viewport.source().is_none() {
            return Err(NavigationError::NoSource);
        }

        let from = self.address();
        let to = match from.checked_offset_bits(delta as i64) {
            Some(to) => to,
            None if delta < 0 => return Err(NavigationError::Underflow),
            None => return Err(NavigationError::OutOfBounds { proposed: u64::MAX, limit: self.viewport.limit() }),
        };

        if to.bytes() == self.caret {
            self.viewport.set_lane(to.bits());
            self.refresh();
            return Ok(ChangeRecord { from, to, paged: false });
        }

        let proposal = self.propose_caret(to.bytes())?;
        self.viewport.set_lane(to.bits());
        self.commit(proposal).map(|record| ChangeRecord { from, ..record })
    }

    pub fn goto(&mut self, address: addr::Address) -> Result<ChangeRecord, NavigationError> {
        let from = self.address();
        let proposal = self.propose_caret(address.bytes())?;
        self.viewport.set_lane(address.bits());
        self.commit(proposal).map(|record| ChangeRecord { from, ..record })
    }

    /// Places the caret on cell `cell` of the visible page.
    pub fn click(&mut self, cell: u64) -> Result<ChangeRecord, NavigationError> {
        if cell >= self.viewport.page_size() {
            return Err(NavigationError::OutOfBounds {
                proposed: self.viewport.offset().saturating_add(cell),
                limit: self.viewport.limit(),
            });
        }

        let proposal = self.propose_caret(self.viewport.offset() + cell)?;
        self.commit(proposal)
    }

    /// Scrolls the page by whole rows. The caret stays where it is, even if
    /// that leaves it off-page; the next caret move pages back to it.
    pub fn scroll(&mut self, rows: i64) -> Result<ChangeRecord, NavigationError> {
        if self.viewport.source().is_none() {
            return Err(NavigationError::NoSource);
        }

        let from = self.address();
        let before = self.viewport.offset();

        let result = self.viewport.skip(rows.saturating_mul(self.viewport.cols() as i64));
        self.refresh();
        result.map_err(NavigationError::Source)?;

        Ok(ChangeRecord { from, to: from, paged: self.viewport.offset() != before })
    }

    pub fn begin_selecting(&mut self) -> ChangeRecord {
        self.selecting = true;
        if self.mark.is_none() {
            self.mark = Some(self.caret);
        }
        self.unchanged()
    }

    pub fn end_selecting(&mut self) -> ChangeRecord {
        self.selecting = false;
        self.unchanged()
    }

    /// Appends the live selection to the tags, with the tag colour.
    pub fn confirm_selection(&mut self) -> Result<ChangeRecord, NavigationError> {
        let mark = self.mark.ok_or(NavigationError::NoMark)?;
        let tag = selection::Selection::new(mark, self.caret, self.tag_color);

        tracing::info!(mark, caret = self.caret, tags = self.tags.len() + 1, "tagged selection");
        self.tags.push_back(tag);

        Ok(self.unchanged())
    }

    fn unchanged(&self) -> ChangeRecord {
        ChangeRecord { from: self.address(), to: self.address(), paged: false }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, command: Command) -> Result<ChangeRecord, NavigationError> {
        let cols = self.viewport.cols() as u64;
        let page = self.viewport.page_size();
        let limit = self.viewport.limit();
        let caret = self.caret;

        let result = match command {
            Command::MoveLeft => self.propose_offset(-1).and_then(|p| self.commit(p)),
            Command::MoveRight => self.propose_offset(1).and_then(|p| self.commit(p)),
            Command::MoveUp => self.propose_offset(-(cols as i64)).and_then(|p| self.commit(p)),
            Command::MoveDown => self.propose_caret(std::cmp::min(caret.saturating_add(cols), limit)).and_then(|p| self.commit(p)),
            Command::RowStart => self.propose_caret(caret - caret % cols).and_then(|p| self.commit(p)),
            Command::RowEnd => self.propose_caret(std::cmp::min(caret - caret % cols + (cols - 1), limit)).and_then(|p| self.commit(p)),
            Command::DocumentStart => self.propose_caret(0).and_then(|p| self.commit(p)),
            Command::DocumentEnd => self.propose_caret(limit).and_then(|p| self.commit(p)),
            Command::PageUp => self.propose_offset(-(page as i64)).and_then(|p| self.commit(p)),
            Command::PageDown => self.propose_caret(std::cmp::min(caret.saturating_add(page), limit)).and_then(|p| self.commit(p)),

            Command::BeginSelecting => Ok(self.begin_selecting()),
            Command::EndSelecting => Ok(self.end_selecting()),
            Command::ConfirmSelection => self.confirm_selection(),

            Command::ShiftLane(delta) => self.shift_lane(delta),
            Command::Scroll(rows) => self.scroll(rows),
            Command::Click(cell) => self.click(cell),
            Command::Goto(address) => self.goto(address),
        };

        match &result {
            Ok(record) => tracing::trace!(from = %record.from, to = %record.to, paged = record.paged, "applied"),
            Err(NavigationError::Source(e)) => tracing::warn!(error = %e, caret = self.caret, "moved caret but couldn't page"),
            Err(e) => tracing::debug!(error = %e, "rejected"),
        }

        result
    }
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::OutOfBounds { proposed, limit } => write!(f, "Address {:#x} is past the end ({:#x})", proposed, limit),
            NavigationError::Underflow => write!(f, "Can't move before the start"),
            NavigationError::NoSource => write!(f, "No source attached"),
            NavigationError::NoMark => write!(f, "No mark to select from"),
            NavigationError::Source(e) => write!(f, "Couldn't load page: {}", e),
        }
    }
}

impl std::error::Error for NavigationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavigationError::Source(e) => Some(e),
            _ => None,
        }
    }
}
