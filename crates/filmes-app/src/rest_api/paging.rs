use crate::error::{ApiError, ApiResult};
use filmes_dal::{movie::MovieField, ListingParams, Order};
use garde::Validate;

/// Query parameters selecting window `[skip, skip + take)` of a listing
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct Window {
    /// Number of records to skip
    #[garde(range(min = 0))]
    pub skip: Option<i64>,
    /// Number of records to return
    #[garde(range(min = 1))]
    pub take: Option<i64>,
    /// Comma separated field names, prefix `-` for descending order
    #[garde(length(max = 255))]
    pub sort: Option<String>,
}

impl Window {
    pub fn into_listing_params(self, default_take: u32, max_take: u32) -> ApiResult<ListingParams> {
        self.validate()
            .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;
        let offset = self.skip.unwrap_or(0);
        // large windows are truncated, not rejected
        let limit = self
            .take
            .unwrap_or(default_take.into())
            .min(i64::from(max_take));
        let order = self.sort.map(parse_ordering).transpose()?;

        Ok(ListingParams {
            offset,
            limit,
            order,
        })
    }
}

fn parse_ordering(orderings: String) -> ApiResult<Vec<Order>> {
    orderings
        .split(',')
        .map(|name| {
            let (field_name, descending) = match name.trim() {
                "" => return Err(ApiError::InvalidQuery("Empty ordering name".to_string())),
                name if name.len() > 100 => {
                    return Err(ApiError::InvalidQuery("Ordering name too long".to_string()))
                }
                name if name.starts_with('+') => (&name[1..], false),
                name if name.starts_with('-') => (&name[1..], true),
                name => (name, false),
            };
            // clients use wire names, database columns differ
            let column = field_name
                .parse::<MovieField>()
                .map(|f| f.column().to_string())
                .unwrap_or_else(|_| field_name.to_string());

            let order = if descending {
                Order::Desc(column)
            } else {
                Order::Asc(column)
            };

            Ok(order)
        })
        .collect::<Result<Vec<_>, _>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(skip: Option<i64>, take: Option<i64>, sort: Option<&str>) -> Window {
        Window {
            skip,
            take,
            sort: sort.map(String::from),
        }
    }

    #[test]
    fn test_defaults() {
        let params = Window::default().into_listing_params(10, 1000).unwrap();
        assert_eq!(0, params.offset);
        assert_eq!(10, params.limit);
        assert!(params.order.is_none());
    }

    #[test]
    fn test_window() {
        let params = window(Some(1), Some(2), None)
            .into_listing_params(10, 1000)
            .unwrap();
        assert_eq!(1, params.offset);
        assert_eq!(2, params.limit);
    }

    #[test]
    fn test_large_take_capped() {
        let params = window(Some(0), Some(5000), None)
            .into_listing_params(10, 1000)
            .unwrap();
        assert_eq!(1000, params.limit);

        let params = window(None, Some(1000), None)
            .into_listing_params(10, 1000)
            .unwrap();
        assert_eq!(1000, params.limit);
    }

    #[test]
    fn test_invalid_window() {
        for w in [
            window(Some(-1), None, None),
            window(None, Some(0), None),
            window(None, None, Some("titulo,,id")),
        ] {
            assert!(matches!(
                w.into_listing_params(10, 1000),
                Err(ApiError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_sort() {
        let params = window(None, None, Some("-duracao, titulo,+id"))
            .into_listing_params(10, 1000)
            .unwrap();
        assert_eq!(
            Some(vec![
                Order::Desc("duration".into()),
                Order::Asc("title".into()),
                Order::Asc("id".into())
            ]),
            params.order
        );
    }
}
