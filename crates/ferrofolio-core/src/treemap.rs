//! Hierarchical size/colour model of a valued portfolio.
//!
//! The tree is `root -> market -> ticker`. Tile area follows the
//! reporting-currency market value and tile colour follows profit on a
//! diverging scale centred at zero. Rows without a price cannot be sized, so
//! they are listed in [`Treemap::unpriced`] instead of being drawn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::valuation::EnrichedHolding;
use crate::{Market, Ticker};

const LOSS_RGB: (u8, u8, u8) = (0xd7, 0x30, 0x27);
const NEUTRAL_RGB: (u8, u8, u8) = (0xff, 0xff, 0xbf);
const GAIN_RGB: (u8, u8, u8) = (0x1a, 0x98, 0x50);

/// Red -> yellow -> green scale, symmetric around zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergingScale {
    max_abs: f64,
}

impl DivergingScale {
    /// Scale spanning `[-m, m]`, where `m` is the largest finite `|value|`.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let max_abs = values
            .into_iter()
            .filter(|value| value.is_finite())
            .map(f64::abs)
            .fold(0.0, f64::max);
        Self { max_abs }
    }

    pub fn max_abs(&self) -> f64 {
        self.max_abs
    }

    /// Position in `[0, 1]`; zero maps to `0.5`.
    pub fn position(&self, value: f64) -> f64 {
        if self.max_abs == 0.0 || !value.is_finite() {
            return 0.5;
        }
        (0.5 + value / self.max_abs / 2.0).clamp(0.0, 1.0)
    }

    /// `#rrggbb` colour for `value`.
    pub fn color(&self, value: f64) -> String {
        let position = self.position(value);
        let (from, to, t) = if position < 0.5 {
            (LOSS_RGB, NEUTRAL_RGB, position * 2.0)
        } else {
            (NEUTRAL_RGB, GAIN_RGB, (position - 0.5) * 2.0)
        };
        let channel =
            |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;

        format!(
            "#{:02x}{:02x}{:02x}",
            channel(from.0, to.0),
            channel(from.1, to.1),
            channel(from.2, to.2)
        )
    }
}

/// One tile. Branch values and profits are sums of their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapNode {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub profit: f64,
    pub fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreemapNode>,
}

impl TreemapNode {
    fn branch(
        id: String,
        label: String,
        children: Vec<TreemapNode>,
        scale: &DivergingScale,
    ) -> Self {
        let value = children.iter().map(|child| child.value).sum();
        let profit = children.iter().map(|child| child.profit).sum();
        Self {
            id,
            label,
            value,
            profit,
            fill: scale.color(profit),
            change_pct: None,
            current_price: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Share of `total` covered by this tile, `0.0` for an empty total.
    pub fn share_of(&self, total: f64) -> f64 {
        if total > 0.0 {
            self.value / total
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treemap {
    pub root: TreemapNode,
    pub scale: DivergingScale,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unpriced: Vec<Ticker>,
}

impl Treemap {
    /// Builds the tree from valued rows.
    ///
    /// Rows sharing a market and ticker are merged into one tile. Leaves are
    /// ordered by descending value, markets in their declaration order.
    pub fn build(rows: &[EnrichedHolding], root_label: &str) -> Self {
        let scale = DivergingScale::from_values(rows.iter().filter_map(|row| row.profit_reporting));
        let mut markets: BTreeMap<Market, Vec<TreemapNode>> = BTreeMap::new();
        let mut unpriced = Vec::new();

        for row in rows {
            let (Some(value), Some(profit)) = (row.market_value_reporting, row.profit_reporting)
            else {
                if !unpriced.contains(&row.ticker) {
                    unpriced.push(row.ticker.clone());
                }
                continue;
            };

            let leaves = markets.entry(row.market).or_default();
            let id = format!("{}/{}/{}", root_label, row.market, row.ticker);
            match leaves.iter_mut().find(|leaf| leaf.id == id) {
                Some(leaf) => {
                    leaf.value += value;
                    leaf.profit += profit;
                }
                None => leaves.push(TreemapNode {
                    id,
                    label: row.ticker.to_string(),
                    value,
                    profit,
                    fill: String::new(),
                    change_pct: row.change_pct,
                    current_price: row.current_price,
                    children: Vec::new(),
                }),
            }
        }

        let children = markets
            .into_iter()
            .map(|(market, mut leaves)| {
                for leaf in &mut leaves {
                    leaf.fill = scale.color(leaf.profit);
                }
                leaves.sort_by(|a, b| b.value.total_cmp(&a.value));
                TreemapNode::branch(
                    format!("{root_label}/{market}"),
                    market.to_string(),
                    leaves,
                    &scale,
                )
            })
            .collect();

        Self {
            root: TreemapNode::branch(
                root_label.to_owned(),
                root_label.to_owned(),
                children,
                &scale,
            ),
            scale,
            unpriced,
        }
    }
}
