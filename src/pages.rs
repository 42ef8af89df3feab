//! Page navigation: a closed set of pages, each rendered from shared state.

use std::str::FromStr;

use serde::Serialize;

use crate::app_state::AppState;
use crate::errors::{DashError, DashResult};
use crate::form::Form;
use crate::trends::{PriceTrends, SatisfactionTrends};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    FlightPrice,
    CustomerSatisfaction,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::FlightPrice, Page::CustomerSatisfaction];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::FlightPrice => "flight-price",
            Page::CustomerSatisfaction => "customer-satisfaction",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::FlightPrice => "Flight Price Prediction",
            Page::CustomerSatisfaction => "Customer Satisfaction Analysis",
        }
    }

    pub fn render<'a>(&self, state: &'a AppState) -> DashResult<PageView<'a>> {
        let content = match self {
            Page::Home => PageContent::Home {
                heading: "Welcome to the Flight Price and Customer Satisfaction Prediction App!",
                description: "Predict flight prices and analyze customer satisfaction to make \
                              better travel decisions. Pick a page to explore the predictions.",
                pages: Page::ALL.iter().filter(|p| **p != Page::Home).map(PageLink::from).collect(),
            },
            Page::FlightPrice => {
                let dashboard = state.price()?;
                PageContent::FlightPrice {
                    model_id: dashboard.model_id(),
                    form: dashboard.form(),
                    trends: dashboard.trends(),
                }
            }
            Page::CustomerSatisfaction => {
                let dashboard = state.satisfaction()?;
                PageContent::CustomerSatisfaction {
                    model_id: dashboard.model_id(),
                    encoding: dashboard.encoding().to_string(),
                    form: dashboard.form(),
                    trends: dashboard.trends(),
                }
            }
        };

        Ok(PageView {
            page: *self,
            title: self.title(),
            content,
        })
    }
}

impl FromStr for Page {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| DashError::not_found("page", s))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub slug: &'static str,
    pub title: &'static str,
}

impl From<&Page> for PageLink {
    fn from(page: &Page) -> Self {
        PageLink {
            slug: page.slug(),
            title: page.title(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub page: Page,
    pub title: &'static str,
    pub content: PageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent<'a> {
    Home {
        heading: &'static str,
        description: &'static str,
        pages: Vec<PageLink>,
    },
    FlightPrice {
        model_id: &'a str,
        form: Form,
        trends: &'a PriceTrends,
    },
    CustomerSatisfaction {
        model_id: &'a str,
        encoding: String,
        form: Form,
        trends: &'a SatisfactionTrends,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.slug().parse::<Page>().unwrap(), page);
        }
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn home_renders_without_dashboards() {
        let state = AppState::from_parts(
            Err(DashError::config("missing")),
            Err(DashError::config("missing")),
        );
        let view = Page::Home.render(&state).unwrap();
        match view.content {
            PageContent::Home { pages, .. } => assert_eq!(pages.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Page::FlightPrice.render(&state).unwrap_err().is_configuration());
    }
}
