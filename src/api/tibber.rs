use chrono::{DateTime, FixedOffset, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use ureq::Agent;

use crate::{
    api::client::new_agent,
    core::{
        dataset::{Address, Owner},
        price::{PriceInterval, PriceTable},
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

const URL: &str = "https://api.tibber.com/v1-beta/gql";

/// Hourly consumption and prices of the first home of the account.
pub struct Api {
    client: Agent,
    authorization: String,
    page_size: u32,
}

impl Api {
    pub fn new(access_token: &str, page_size: u32) -> Self {
        Self { client: new_agent(), authorization: format!("Bearer {access_token}"), page_size }
    }

    /// Fetch the whole consumption history, following the pages until the last one.
    #[instrument(skip_all, fields(page_size = self.page_size))]
    pub fn get_prices(&self) -> Result<PriceExport> {
        collect_pages(|after| self.get_page(after))
    }

    fn get_page(&self, after: Option<&str>) -> Result<Home> {
        let response = self
            .client
            .post(URL)
            .header("Authorization", &self.authorization)
            .send_json(Request::new(self.page_size, after))
            .context("failed to request the consumption page")?
            .body_mut()
            .read_json::<Response>()
            .context("failed to deserialize the consumption page")?;
        response.into_home()
    }
}

/// Join the pages into one export, requesting each next page after the previous cursor.
fn collect_pages(mut get_page: impl FnMut(Option<&str>) -> Result<Home>) -> Result<PriceExport> {
    let mut intervals = Vec::new();
    let mut cursor: Option<String> = None;
    let mut n_pages: usize = 0;
    loop {
        let home = get_page(cursor.as_deref())?;
        n_pages += 1;
        let connection = home.consumption;
        debug!(n_pages, n_nodes = connection.nodes.len(), "fetched a page");
        intervals.extend(connection.nodes.into_iter().filter_map(Node::into_price_interval));

        if !connection.page_info.has_next_page {
            info!(n_pages, n_prices = intervals.len(), "fetched");
            return Ok(PriceExport {
                prices: PriceTable::from(intervals),
                address: home.address.map(Into::into),
                owner: home.owner.map(Into::into),
            });
        }
        let next_cursor =
            connection.page_info.end_cursor.context("next page announced without a cursor")?;
        ensure!(
            cursor.as_deref() != Some(next_cursor.as_str()),
            "the cursor did not advance past `{next_cursor}`",
        );
        cursor = Some(next_cursor);
    }
}

#[must_use]
pub struct PriceExport {
    pub prices: PriceTable,
    pub address: Option<Address>,
    pub owner: Option<Owner>,
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

impl<'a> Request<'a> {
    const fn new(first: u32, after: Option<&'a str>) -> Self {
        Self {
            query: "query Consumption($first: Int!, $after: String) { viewer { homes { address { address1 postalCode city } owner { firstName lastName } consumption(resolution: HOURLY, first: $first, after: $after) { pageInfo { hasNextPage endCursor } nodes { from to cost unitPrice consumption } } } } }",
            variables: Variables { first, after },
        }
    }
}

#[derive(Serialize)]
struct Variables<'a> {
    first: u32,
    after: Option<&'a str>,
}

#[derive(Deserialize)]
struct Response {
    data: Option<Data>,

    #[serde(default)]
    errors: Vec<GraphQlError>,
}

impl Response {
    fn into_home(self) -> Result<Home> {
        ensure!(
            self.errors.is_empty(),
            "the API returned errors: {}",
            self.errors.iter().map(|error| error.message.as_str()).join("; "),
        );
        self.data
            .context("the response contains no data")?
            .viewer
            .homes
            .into_iter()
            .next()
            .context("the account has no homes")
    }
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    homes: Vec<Home>,
}

#[derive(Deserialize)]
struct Home {
    address: Option<TibberAddress>,
    owner: Option<TibberOwner>,
    consumption: Connection,
}

#[derive(Deserialize)]
struct Connection {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,

    nodes: Vec<Node>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    unit_price: Option<f64>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    consumption: f64,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    cost: f64,
}

impl Node {
    fn into_price_interval(self) -> Option<PriceInterval> {
        let Some(unit_price) = self.unit_price else {
            debug!(from = %self.from, "skipping an hour without a price");
            return None;
        };
        if self.from >= self.to {
            warn!(from = %self.from, to = %self.to, "skipping an empty price interval");
            return None;
        }
        Some(
            PriceInterval::builder()
                .from(self.from.with_timezone(&Local))
                .to(self.to.with_timezone(&Local))
                .unit_price(KilowattHourRate::from(unit_price))
                .consumption(KilowattHours::from(self.consumption))
                .cost(Cost::from(self.cost))
                .build(),
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TibberAddress {
    address1: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
}

impl From<TibberAddress> for Address {
    fn from(address: TibberAddress) -> Self {
        let default = Self::default();
        Self {
            line1: address.address1.unwrap_or(default.line1),
            postal_code: address.postal_code.unwrap_or(default.postal_code),
            city: address.city.unwrap_or(default.city),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TibberOwner {
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<TibberOwner> for Owner {
    fn from(owner: TibberOwner) -> Self {
        let default = Self::default();
        Self {
            first_name: owner.first_name.unwrap_or(default.first_name),
            last_name: owner.last_name.unwrap_or(default.last_name),
        }
    }
}
