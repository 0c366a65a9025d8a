//! Presentation side of the viewer. Renderers only see the core through
//! [`ViewState`] and never change it.

use crate::model::addr;
use crate::model::inspector;
use crate::model::navigation;
use crate::model::selection;

pub mod text;

pub trait ViewState {
    fn caret(&self) -> u64;
    fn lane(&self) -> u8;
    fn mark(&self) -> Option<u64>;
    fn selections(&self) -> imbl::Vector<selection::Selection>;
    fn live_selection(&self) -> Option<selection::Selection>;

    fn offset(&self) -> u64;
    fn cols(&self) -> u32;
    fn rows(&self) -> u32;
    fn limit(&self) -> u64;

    /// The page as read from the source.
    fn page_bytes(&self) -> &[u8];
    /// The page as seen through the current bit lane.
    fn lane_bytes(&self) -> Vec<u8>;
    fn panels(&self) -> &inspector::Panels;

    fn address(&self) -> addr::Address {
        addr::Address::new(self.caret(), self.lane())
    }
}

impl ViewState for navigation::NavigationModel {
    fn caret(&self) -> u64 { navigation::NavigationModel::caret(self) }
    fn lane(&self) -> u8 { navigation::NavigationModel::lane(self) }
    fn mark(&self) -> Option<u64> { navigation::NavigationModel::mark(self) }
    fn selections(&self) -> imbl::Vector<selection::Selection> { navigation::NavigationModel::selections(self).clone() }
    fn live_selection(&self) -> Option<selection::Selection> { navigation::NavigationModel::live_selection(self) }

    fn offset(&self) -> u64 { self.viewport().offset() }
    fn cols(&self) -> u32 { self.viewport().cols() }
    fn rows(&self) -> u32 { self.viewport().rows() }
    fn limit(&self) -> u64 { navigation::NavigationModel::limit(self) }

    fn page_bytes(&self) -> &[u8] { self.viewport().bytes() }
    fn lane_bytes(&self) -> Vec<u8> { self.viewport().lane_bytes() }
    fn panels(&self) -> &inspector::Panels { navigation::NavigationModel::panels(self) }

    fn address(&self) -> addr::Address { navigation::NavigationModel::address(self) }
}
