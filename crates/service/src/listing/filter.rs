use models::listing;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

use super::domain::FilterOptions;

/// Escape `\`, `%` and `_` so user text matches literally inside a LIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `lower(col) LIKE '%needle%'` with literal matching of the needle.
fn contains_ci(col: listing::Column, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((listing::Entity, col)))).like(LikeExpr::new(pattern).escape('\\'))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterOptions {
    /// Predicate shared by the count and the page query.
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(animal_type) = non_blank(&self.animal_type) {
            cond = cond.add(contains_ci(listing::Column::AnimalType, animal_type));
        }
        if let Some(location) = non_blank(&self.location) {
            cond = cond.add(contains_ci(listing::Column::Location, location));
        }
        if let Some(from) = self.date_from {
            cond = cond.add(listing::Column::DateLost.gte(from));
        }
        if let Some(to) = self.date_to {
            cond = cond.add(listing::Column::DateLost.lte(to));
        }
        cond
    }
}
