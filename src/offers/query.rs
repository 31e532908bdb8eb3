use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Raw search parameters as the client sent them. Every field is optional
/// text; numeric interpretation happens in [`OfferQuery::from_params`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    #[serde(rename = "priceMin")]
    pub price_min: Option<String>,
    #[serde(rename = "priceMax")]
    pub price_max: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Asc,
    Desc,
}

/// Validated filter/sort/pagination intent for one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferQuery {
    /// Case-insensitive substring match against the title, any position.
    pub title: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sort: Option<PriceSort>,
    pub page: i64,
    pub page_size: i64,
}

impl OfferQuery {
    /// Translate raw parameters, permissively: a parameter that does not
    /// parse is treated as absent and its default applies. A search request
    /// is never rejected for bad filter syntax.
    pub fn from_params(params: &SearchParams) -> Self {
        Self {
            title: params.title.clone().filter(|t| !t.is_empty()),
            price_min: parse_price(params.price_min.as_deref()),
            price_max: parse_price(params.price_max.as_deref()),
            sort: parse_sort(params.sort.as_deref()),
            page: parse_positive(params.page.as_deref(), DEFAULT_PAGE),
            page_size: parse_positive(params.limit.as_deref(), DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_sort(raw: Option<&str>) -> Option<PriceSort> {
    match raw {
        Some("price-asc") => Some(PriceSort::Asc),
        Some("price-desc") => Some(PriceSort::Desc),
        _ => None,
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let mut p = SearchParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "title" => p.title = v,
                "priceMin" => p.price_min = v,
                "priceMax" => p.price_max = v,
                "sort" => p.sort = v,
                "page" => p.page = v,
                "limit" => p.limit = v,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn empty_params_use_defaults() {
        let q = OfferQuery::from_params(&SearchParams::default());
        assert_eq!(q.title, None);
        assert_eq!(q.price_min, None);
        assert_eq!(q.price_max, None);
        assert_eq!(q.sort, None);
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn full_composition() {
        let q = OfferQuery::from_params(&params(&[
            ("priceMin", "10"),
            ("priceMax", "50"),
            ("sort", "price-desc"),
            ("page", "2"),
            ("limit", "5"),
        ]));
        assert_eq!(q.price_min, Some(10.0));
        assert_eq!(q.price_max, Some(50.0));
        assert_eq!(q.sort, Some(PriceSort::Desc));
        assert_eq!(q.page, 2);
        assert_eq!(q.page_size, 5);
        assert_eq!(q.offset(), 5);
    }

    #[test]
    fn price_bounds_combine_without_overwriting() {
        let q = OfferQuery::from_params(&params(&[("priceMin", "10"), ("priceMax", "50")]));
        assert_eq!(q.price_min, Some(10.0));
        assert_eq!(q.price_max, Some(50.0));
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let q = OfferQuery::from_params(&params(&[
            ("priceMin", "cheap"),
            ("priceMax", "NaN"),
            ("page", "two"),
            ("limit", "3.5"),
        ]));
        assert_eq!(q.price_min, None);
        assert_eq!(q.price_max, None);
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 10);
    }

    #[test]
    fn non_positive_pagination_falls_back() {
        let q = OfferQuery::from_params(&params(&[("page", "0"), ("limit", "-3")]));
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 10);
    }

    #[test]
    fn unknown_sort_means_no_sort() {
        assert_eq!(parse_sort(Some("price-asc")), Some(PriceSort::Asc));
        assert_eq!(parse_sort(Some("price-desc")), Some(PriceSort::Desc));
        assert_eq!(parse_sort(Some("title-asc")), None);
        assert_eq!(parse_sort(Some("")), None);
        assert_eq!(parse_sort(None), None);
    }

    #[test]
    fn empty_title_is_absent() {
        let q = OfferQuery::from_params(&params(&[("title", "")]));
        assert_eq!(q.title, None);
    }

    // In-memory rendition of the search semantics, used to pin down how a
    // parsed query composes end to end.
    fn run(fixture: &[(&str, f64)], q: &OfferQuery) -> (Vec<f64>, usize) {
        let mut matched: Vec<(&str, f64)> = fixture
            .iter()
            .filter(|(title, price)| {
                let title_ok = q
                    .title
                    .as_ref()
                    .map(|p| title.to_lowercase().contains(&p.to_lowercase()))
                    .unwrap_or(true);
                let min_ok = q.price_min.map(|m| *price >= m).unwrap_or(true);
                let max_ok = q.price_max.map(|m| *price <= m).unwrap_or(true);
                title_ok && min_ok && max_ok
            })
            .cloned()
            .collect();
        match q.sort {
            Some(PriceSort::Asc) => matched.sort_by(|a, b| a.1.total_cmp(&b.1)),
            Some(PriceSort::Desc) => matched.sort_by(|a, b| b.1.total_cmp(&a.1)),
            None => {}
        }
        let total = matched.len();
        let page: Vec<f64> = matched
            .into_iter()
            .skip(q.offset() as usize)
            .take(q.page_size as usize)
            .map(|(_, price)| price)
            .collect();
        (page, total)
    }

    fn twelve_offers() -> Vec<(&'static str, f64)> {
        // prices 0, 10, ..., 110
        (0..12).map(|i| ("Jacket", (i * 10) as f64)).collect()
    }

    #[test]
    fn filtered_sorted_second_page() {
        let q = OfferQuery::from_params(&params(&[
            ("priceMin", "10"),
            ("priceMax", "50"),
            ("sort", "price-desc"),
            ("page", "2"),
            ("limit", "5"),
        ]));
        let (page, total) = run(&twelve_offers(), &q);
        // five offers priced 10..=50; page 1 holds all five descending,
        // page 2 would start past them
        assert_eq!(total, 5);
        assert_eq!(page, Vec::<f64>::new());

        let first = OfferQuery { page: 1, ..q };
        let (page, total) = run(&twelve_offers(), &first);
        assert_eq!(total, 5);
        assert_eq!(page, vec![50.0, 40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn title_match_is_case_insensitive_substring() {
        let fixture = vec![("Red Jacket", 20.0), ("Blue Coat", 30.0)];
        let red = OfferQuery {
            title: Some("red".into()),
            ..OfferQuery::from_params(&SearchParams::default())
        };
        assert_eq!(run(&fixture, &red).1, 1);
        let jacket = OfferQuery {
            title: Some("JACKET".into()),
            ..red
        };
        assert_eq!(run(&fixture, &jacket).1, 1);
    }

    #[test]
    fn pages_partition_the_matches() {
        let fixture = twelve_offers();
        for page_size in 1..=13i64 {
            let mut seen = Vec::new();
            let mut page = 1i64;
            loop {
                let q = OfferQuery {
                    title: None,
                    price_min: None,
                    price_max: None,
                    sort: Some(PriceSort::Asc),
                    page,
                    page_size,
                };
                let (chunk, total) = run(&fixture, &q);
                assert_eq!(total, 12);
                if chunk.is_empty() {
                    break;
                }
                seen.extend(chunk);
                page += 1;
            }
            let expected: Vec<f64> = (0..12).map(|i| (i * 10) as f64).collect();
            assert_eq!(seen, expected, "page_size {page_size}");
        }
    }
}
