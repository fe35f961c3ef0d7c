use serde::{Deserialize, Serialize};

use crate::models::{Category, Page, ValuedHolding, PAGE_SIZE};

/// Category tabs of the holdings table. Flat holdings only appear under `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Gainer,
    Decliners,
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Gainer => category == Category::Gainer,
            CategoryFilter::Decliners => category == Category::Decliner,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub page: usize,
}

fn matches_search(holding: &ValuedHolding, search: &str) -> bool {
    let needle = search.to_lowercase();
    holding.ticker.to_lowercase().contains(&needle) || holding.name.to_lowercase().contains(&needle)
}

pub fn query(holdings: &[ValuedHolding], query: &PortfolioQuery) -> Page<ValuedHolding> {
    let rows: Vec<ValuedHolding> = holdings
        .iter()
        .filter(|h| matches_search(h, &query.search) && query.category.admits(h.category))
        .cloned()
        .collect();
    Page::slice(&rows, query.page, PAGE_SIZE)
}

// Interactive state of the holdings table. Its page counter is separate
// from the transactions table and is not reset by search or category edits.
#[derive(Debug, Clone)]
pub struct PortfolioViewState {
    query: PortfolioQuery,
}

impl Default for PortfolioViewState {
    fn default() -> Self {
        Self {
            query: PortfolioQuery {
                search: String::new(),
                category: CategoryFilter::All,
                page: 1,
            },
        }
    }
}

impl PortfolioViewState {
    pub fn set_search(&mut self, text: &str) {
        self.query.search = text.to_string();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.query.category = category;
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = page.max(1);
    }

    pub fn page(&self) -> usize {
        self.query.page
    }

    pub fn apply(&self, holdings: &[ValuedHolding]) -> Page<ValuedHolding> {
        query(holdings, &self.query)
    }
}
