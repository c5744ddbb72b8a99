//! Turn the latest fetched quotes into display order.
//!
//! Order of operations: drop quotes for tickers no longer in the profile,
//! apply the filter, sort by the profile's column, then (when grouping is on)
//! stable-split into advancing issues followed by declining ones.

use std::cmp::Ordering;

use crate::profile::Profile;

use super::{Column, Quote};

pub fn arrange<'a>(quotes: &'a [Quote], profile: &Profile) -> Vec<&'a Quote> {
    let filter = profile.filter_expr();
    let mut rows: Vec<&Quote> = quotes
        .iter()
        .filter(|q| profile.tickers.iter().any(|t| t == &q.ticker))
        .filter(|q| filter.map_or(true, |f| f.matches(q)))
        .collect();

    let column = profile.sort_column();
    rows.sort_by(|a, b| {
        let ord = compare(a, b, column);
        if profile.ascending {
            ord
        } else {
            ord.reverse()
        }
    });

    if profile.grouped {
        let (advancing, declining): (Vec<&Quote>, Vec<&Quote>) =
            rows.into_iter().partition(|q| q.advancing());
        rows = advancing;
        rows.extend(declining);
    }

    rows
}

fn compare(a: &Quote, b: &Quote, column: Column) -> Ordering {
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.ticker.cmp(&b.ticker)),
        _ => a.ticker.cmp(&b.ticker),
    }
}
