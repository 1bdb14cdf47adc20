/// Identifier of the tab (watcher instance) a snapshot was taken from.
pub type TabId = u64;

/// Which selector battery an element snapshot was collected by.
///
/// The same underlying element may appear under several regions when it
/// matches more than one battery; each occurrence is checked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Order-context elements: class/id containing "order", "venda" or
    /// "pedido", all heading levels, and the generic title/header/info
    /// classes. Searched for order-number patterns.
    OrderContext,
    /// The quantity label block.
    Quantity,
    /// Sublabel / item-information blocks.
    Sublabel,
    /// The detail title text block.
    DetailTitle,
    /// The broad title/description battery used for the promotional phrase.
    TitleDescription,
    /// Button content blocks.
    MessageButton,
}

/// One element captured from the page, decoupled from the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Stable id within one snapshot; highlight directives refer to it.
    pub id: u32,
    pub region: Region,
    /// Visible text content of the element.
    pub text: String,
    /// Inner markup of the element, used for text-range highlighting.
    pub html: String,
}

/// A point-in-time capture of everything the scan needs from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub tab_id: TabId,
    pub url: String,
    /// Full visible text of the page.
    pub text: String,
    pub elements: Vec<ElementSnapshot>,
}

impl PageSnapshot {
    pub fn new(tab_id: TabId, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            text: text.into(),
            elements: Vec::new(),
        }
    }

    /// Appends an element snapshot, assigning it the next region id.
    pub fn push_element(
        &mut self,
        region: Region,
        text: impl Into<String>,
        html: impl Into<String>,
    ) -> u32 {
        let id = self.elements.len() as u32;
        self.elements.push(ElementSnapshot {
            id,
            region,
            text: text.into(),
            html: html.into(),
        });
        id
    }

    pub fn element(&self, id: u32) -> Option<&ElementSnapshot> {
        self.elements.get(id as usize)
    }
}
