//! Decoding of the `/connections` response body.
//!
//! Only the fields the display needs are modelled. Everything else in the
//! payload is skipped, and only the leading entries of `connections[]` and
//! `sections[]` are kept, so the decoder never needs more than a few hundred
//! bytes of stack whatever the response size.

use core::{fmt, marker::PhantomData};

use heapless::{String, Vec};
use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, SeqAccess, Visitor},
};

use super::{Connection, ConnectionList, TransitError, time::extract_time};
use crate::{config::MAX_TRAINS, text::push_truncated};

const UNESCAPE_SCRATCH_BYTES: usize = 256;

/// Keeps the first `N` elements of a JSON array and skips the rest.
struct FirstN<T, const N: usize>(Vec<T, N>);

impl<'de, T, const N: usize> Deserialize<'de> for FirstN<T, N>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FirstNVisitor<T, const N: usize>(PhantomData<T>);

        impl<'de, T, const N: usize> Visitor<'de> for FirstNVisitor<T, N>
        where
            T: Deserialize<'de>,
        {
            type Value = FirstN<T, N>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while !items.is_full() {
                    match seq.next_element::<T>()? {
                        Some(item) => {
                            let _ = items.push(item);
                        }
                        None => return Ok(FirstN(items)),
                    }
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(FirstN(items))
            }
        }

        deserializer.deserialize_seq(FirstNVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
struct RawResponse {
    connections: Option<FirstN<RawConnection, { MAX_TRAINS as usize }>>,
}

#[derive(Deserialize)]
struct RawConnection {
    #[serde(rename = "from")]
    origin: Option<RawCheckpoint>,
    #[serde(rename = "to")]
    destination: Option<RawCheckpoint>,
    sections: Option<FirstN<RawSection, 1>>,
}

#[derive(Deserialize)]
struct RawCheckpoint {
    departure: Option<String<40>>,
    arrival: Option<String<40>>,
    platform: Option<String<16>>,
}

#[derive(Deserialize)]
struct RawSection {
    journey: Option<RawJourney>,
}

#[derive(Deserialize)]
struct RawJourney {
    category: Option<String<16>>,
    number: Option<String<16>>,
}

impl RawConnection {
    fn into_connection(self, fetched_at_ms: u64) -> Result<Connection, TransitError> {
        let origin = self.origin.ok_or(TransitError::MissingFields)?;
        let destination = self.destination.ok_or(TransitError::MissingFields)?;
        let departure = origin.departure.as_deref().ok_or(TransitError::MissingFields)?;
        let arrival = destination
            .arrival
            .as_deref()
            .ok_or(TransitError::MissingFields)?;

        let mut connection = Connection {
            departure: extract_time(departure),
            arrival: extract_time(arrival),
            fetched_at_ms,
            ..Connection::default()
        };

        match origin.platform.as_deref() {
            Some(platform) if !platform.is_empty() => {
                let _ = push_truncated(&mut connection.platform, platform);
            }
            _ => {
                let _ = connection.platform.push('?');
            }
        }

        // A first leg without journey data is a walk or a dropped service.
        let journey = self
            .sections
            .and_then(|sections| sections.0.into_iter().next())
            .and_then(|section| section.journey);
        match journey {
            Some(RawJourney {
                category: Some(category),
                number: Some(number),
            }) => {
                let _ = push_truncated(&mut connection.train_number, &category);
                let _ = push_truncated(&mut connection.train_number, " ");
                let _ = push_truncated(&mut connection.train_number, &number);
            }
            Some(_) => {
                let _ = push_truncated(&mut connection.train_number, "Unknown");
            }
            None => connection.cancelled = true,
        }

        Ok(connection)
    }
}

/// Decodes up to `limit` connections from a response body.
pub fn parse_connections(
    body: &[u8],
    limit: u8,
    fetched_at_ms: u64,
) -> Result<ConnectionList, TransitError> {
    let mut scratch = [0u8; UNESCAPE_SCRATCH_BYTES];
    let (raw, _) = serde_json_core::from_slice_escaped::<RawResponse>(body, &mut scratch)
        .map_err(|_| TransitError::Parse)?;

    let entries = match raw.connections {
        Some(FirstN(entries)) if !entries.is_empty() => entries,
        _ => return Err(TransitError::NoConnections),
    };

    let keep = limit.clamp(1, MAX_TRAINS) as usize;
    let mut connections = ConnectionList::new();
    for entry in entries.into_iter().take(keep) {
        let _ = connections.push(entry.into_connection(fetched_at_ms)?);
    }
    Ok(connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_CONNECTIONS: &str = r#"{
        "connections": [
            {
                "from": {"station": {"name": "Lausanne", "coordinate": {"x": 46.516, "y": 6.629}},
                         "departure": "2025-01-14T15:30:00+0100", "platform": "7"},
                "to": {"arrival": "2025-01-14T16:36:00+0100", "platform": "5"},
                "duration": "00d01:06:00",
                "sections": [
                    {"journey": {"category": "IC", "number": "1715", "passList": [{"station": {}}]}},
                    {"journey": null}
                ]
            },
            {
                "from": {"departure": "2025-01-14T15:45:00+0100", "platform": null},
                "to": {"arrival": "2025-01-14T17:02:00+0100"},
                "sections": [{"journey": {"category": "IR", "number": "2517"}}]
            },
            {
                "from": {"departure": "2025-01-14T16:00:00+0100", "platform": "8"},
                "to": {"arrival": "2025-01-14T17:06:00+0100"},
                "sections": [{"journey": {"category": "IC", "number": "1719"}}]
            }
        ],
        "from": {"name": "Lausanne"},
        "stations": {"from": [], "to": []}
    }"#;

    #[test]
    fn decodes_departures_platforms_and_trains() {
        let connections = parse_connections(THREE_CONNECTIONS.as_bytes(), 3, 42).unwrap();

        assert_eq!(connections.len(), 3);
        assert_eq!(connections[0].departure.as_str(), "15:30");
        assert_eq!(connections[0].arrival.as_str(), "16:36");
        assert_eq!(connections[0].platform.as_str(), "7");
        assert_eq!(connections[0].train_number.as_str(), "IC 1715");
        assert_eq!(connections[0].fetched_at_ms, 42);
        assert_eq!(connections[0].delay_min, 0);
        assert_eq!(connections[1].platform.as_str(), "?");
        assert!(connections.iter().all(|c| !c.cancelled));
    }

    #[test]
    fn limit_caps_the_number_of_rows() {
        let connections = parse_connections(THREE_CONNECTIONS.as_bytes(), 1, 0).unwrap();
        assert_eq!(connections.len(), 1);
    }

    #[test]
    fn extra_entries_beyond_capacity_are_skipped() {
        let body = r#"{"connections":[
            {"from":{"departure":"2025-01-14T10:00:00+0100"},"to":{"arrival":"2025-01-14T11:00:00+0100"},"sections":[{"journey":{"category":"S","number":"1"}}]},
            {"from":{"departure":"2025-01-14T10:10:00+0100"},"to":{"arrival":"2025-01-14T11:10:00+0100"},"sections":[{"journey":{"category":"S","number":"2"}}]},
            {"from":{"departure":"2025-01-14T10:20:00+0100"},"to":{"arrival":"2025-01-14T11:20:00+0100"},"sections":[{"journey":{"category":"S","number":"3"}}]},
            {"from":{"departure":"2025-01-14T10:30:00+0100"},"to":{"arrival":"2025-01-14T11:30:00+0100"},"sections":[{"journey":{"category":"S","number":"4"}}]},
            {"from":{"departure":"2025-01-14T10:40:00+0100"},"to":{"arrival":"2025-01-14T11:40:00+0100"},"sections":[{"journey":{"category":"S","number":"5"}}]}
        ]}"#;

        let connections = parse_connections(body.as_bytes(), 4, 0).unwrap();
        assert_eq!(connections.len(), 4);
        assert_eq!(connections[3].train_number.as_str(), "S 4");
    }

    #[test]
    fn null_journey_marks_connection_cancelled() {
        let body = r#"{"connections":[{
            "from":{"departure":"2025-01-14T15:30:00+0100","platform":"3"},
            "to":{"arrival":"2025-01-14T16:00:00+0100"},
            "sections":[{"journey":null,"walk":{"duration":300}}]
        }]}"#;

        let connections = parse_connections(body.as_bytes(), 1, 0).unwrap();
        assert!(connections[0].cancelled);
        assert!(connections[0].train_number.is_empty());
        assert!(!connections[0].is_valid());
    }

    #[test]
    fn journey_without_category_is_unknown() {
        let body = r#"{"connections":[{
            "from":{"departure":"2025-01-14T15:30:00+0100"},
            "to":{"arrival":"2025-01-14T16:00:00+0100"},
            "sections":[{"journey":{"number":"12"}}]
        }]}"#;

        let connections = parse_connections(body.as_bytes(), 1, 0).unwrap();
        assert_eq!(connections[0].train_number.as_str(), "Unknown");
        assert!(!connections[0].cancelled);
    }

    #[test]
    fn escaped_station_names_are_tolerated() {
        let body = r#"{"connections":[{
            "from":{"station":{"name":"Gen\u00e8ve","id":"8501008"},"note":"IR \/ RE","departure":"2025-01-14T15:30:00+0100","platform":"4"},
            "to":{"arrival":"2025-01-14T16:00:00+0100"},
            "sections":[{"journey":{"category":"IR","number":"90"}}]
        }]}"#;

        let connections = parse_connections(body.as_bytes(), 1, 0).unwrap();
        assert_eq!(connections[0].platform.as_str(), "4");
    }

    #[test]
    fn empty_or_missing_array_means_no_connections() {
        assert_eq!(
            parse_connections(br#"{"connections":[]}"#, 1, 0),
            Err(TransitError::NoConnections)
        );
        assert_eq!(
            parse_connections(br#"{"stations":{}}"#, 1, 0),
            Err(TransitError::NoConnections)
        );
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert_eq!(
            parse_connections(b"<html>502 Bad Gateway</html>", 1, 0),
            Err(TransitError::Parse)
        );
        assert_eq!(
            parse_connections(br#"{"connections":[{"to":{"arrival":"x"}}]}"#, 1, 0),
            Err(TransitError::MissingFields)
        );
    }
}
