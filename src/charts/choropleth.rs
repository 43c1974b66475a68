//! Choropleth Layer Module
//! Resolves country names to map positions and shades them on a "Reds" scale.

use log::warn;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Unrecognized country name(s): {}", .0.join(", "))]
    UnknownCountries(Vec<String>),
}

/// Sequential colour stops (low → high).
const REDS: [[u8; 3]; 9] = [
    [255, 245, 240],
    [254, 224, 210],
    [252, 187, 161],
    [252, 146, 114],
    [251, 106, 74],
    [239, 59, 44],
    [203, 24, 29],
    [165, 15, 21],
    [103, 0, 13],
];

/// (name, ISO-3166 alpha-3, centroid latitude, centroid longitude)
const COUNTRIES: &[(&str, &str, f64, f64)] = &[
    ("Afghanistan", "AFG", 33.9, 67.7),
    ("Albania", "ALB", 41.2, 20.2),
    ("Algeria", "DZA", 28.0, 1.7),
    ("American Samoa", "ASM", -14.3, -170.1),
    ("Andorra", "AND", 42.5, 1.6),
    ("Angola", "AGO", -11.2, 17.9),
    ("Anguilla", "AIA", 18.2, -63.1),
    ("Antigua and Barbuda", "ATG", 17.1, -61.8),
    ("Argentina", "ARG", -38.4, -63.6),
    ("Armenia", "ARM", 40.1, 45.0),
    ("Aruba", "ABW", 12.5, -70.0),
    ("Australia", "AUS", -25.3, 133.8),
    ("Austria", "AUT", 47.5, 14.6),
    ("Azerbaijan", "AZE", 40.1, 47.6),
    ("Bahamas", "BHS", 25.0, -77.4),
    ("Bahrain", "BHR", 26.0, 50.6),
    ("Bangladesh", "BGD", 23.7, 90.4),
    ("Barbados", "BRB", 13.2, -59.5),
    ("Belarus", "BLR", 53.7, 28.0),
    ("Belgium", "BEL", 50.5, 4.5),
    ("Belize", "BLZ", 17.2, -88.5),
    ("Benin", "BEN", 9.3, 2.3),
    ("Bermuda", "BMU", 32.3, -64.8),
    ("Bhutan", "BTN", 27.5, 90.4),
    ("Bolivia", "BOL", -16.3, -63.6),
    ("Bosnia and Herzegovina", "BIH", 43.9, 17.7),
    ("Botswana", "BWA", -22.3, 24.7),
    ("Brazil", "BRA", -14.2, -51.9),
    ("British Virgin Islands", "VGB", 18.4, -64.6),
    ("Brunei", "BRN", 4.5, 114.7),
    ("Bulgaria", "BGR", 42.7, 25.5),
    ("Burkina Faso", "BFA", 12.2, -1.6),
    ("Burundi", "BDI", -3.4, 29.9),
    ("Cambodia", "KHM", 12.6, 105.0),
    ("Cameroon", "CMR", 7.4, 12.4),
    ("Canada", "CAN", 56.1, -106.3),
    ("Cape Verde", "CPV", 16.0, -24.0),
    ("Cayman Islands", "CYM", 19.3, -81.3),
    ("Central African Republic", "CAF", 6.6, 20.9),
    ("Chad", "TCD", 15.5, 18.7),
    ("Chile", "CHL", -35.7, -71.5),
    ("China", "CHN", 35.9, 104.2),
    ("Colombia", "COL", 4.6, -74.3),
    ("Comoros", "COM", -11.9, 43.9),
    ("Congo", "COG", -0.2, 15.8),
    ("Cook Islands", "COK", -21.2, -159.8),
    ("Costa Rica", "CRI", 9.7, -83.8),
    ("Cote d'Ivoire", "CIV", 7.5, -5.5),
    ("Croatia", "HRV", 45.1, 15.2),
    ("Cuba", "CUB", 21.5, -77.8),
    ("Curacao", "CUW", 12.2, -69.0),
    ("Cyprus", "CYP", 35.1, 33.4),
    ("Czech Republic", "CZE", 49.8, 15.5),
    ("Democratic Republic of Congo", "COD", -4.0, 21.8),
    ("Denmark", "DNK", 56.3, 9.5),
    ("Djibouti", "DJI", 11.8, 42.6),
    ("Dominica", "DMA", 15.4, -61.4),
    ("Dominican Republic", "DOM", 18.7, -70.2),
    ("Ecuador", "ECU", -1.8, -78.2),
    ("Egypt", "EGY", 26.8, 30.8),
    ("El Salvador", "SLV", 13.8, -88.9),
    ("Equatorial Guinea", "GNQ", 1.7, 10.3),
    ("Eritrea", "ERI", 15.2, 39.8),
    ("Estonia", "EST", 58.6, 25.0),
    ("Eswatini", "SWZ", -26.5, 31.5),
    ("Ethiopia", "ETH", 9.1, 40.5),
    ("Falkland Islands", "FLK", -51.8, -59.5),
    ("Faroe Islands", "FRO", 61.9, -6.9),
    ("Fiji", "FJI", -17.7, 178.1),
    ("Finland", "FIN", 61.9, 25.7),
    ("France", "FRA", 46.2, 2.2),
    ("French Guiana", "GUF", 3.9, -53.1),
    ("French Polynesia", "PYF", -17.7, -149.4),
    ("Gabon", "GAB", -0.8, 11.6),
    ("Gambia", "GMB", 13.4, -15.3),
    ("Georgia", "GEO", 42.3, 43.4),
    ("Germany", "DEU", 51.2, 10.5),
    ("Ghana", "GHA", 7.9, -1.0),
    ("Gibraltar", "GIB", 36.1, -5.4),
    ("Greece", "GRC", 39.1, 21.8),
    ("Greenland", "GRL", 71.7, -42.6),
    ("Grenada", "GRD", 12.1, -61.7),
    ("Guadeloupe", "GLP", 16.3, -61.6),
    ("Guam", "GUM", 13.4, 144.8),
    ("Guatemala", "GTM", 15.8, -90.2),
    ("Guinea", "GIN", 9.9, -9.7),
    ("Guinea-Bissau", "GNB", 11.8, -15.2),
    ("Guyana", "GUY", 4.9, -58.9),
    ("Haiti", "HTI", 19.0, -72.3),
    ("Honduras", "HND", 15.2, -86.2),
    ("Hong Kong", "HKG", 22.4, 114.1),
    ("Hungary", "HUN", 47.2, 19.5),
    ("Iceland", "ISL", 64.96, -19.0),
    ("India", "IND", 20.6, 79.0),
    ("Indonesia", "IDN", -0.8, 113.9),
    ("Iran", "IRN", 32.4, 53.7),
    ("Iraq", "IRQ", 33.2, 43.7),
    ("Ireland", "IRL", 53.4, -8.2),
    ("Isle of Man", "IMN", 54.2, -4.5),
    ("Israel", "ISR", 31.0, 34.9),
    ("Italy", "ITA", 41.9, 12.6),
    ("Jamaica", "JAM", 18.1, -77.3),
    ("Japan", "JPN", 36.2, 138.3),
    ("Jordan", "JOR", 30.6, 36.2),
    ("Kazakhstan", "KAZ", 48.0, 66.9),
    ("Kenya", "KEN", -0.02, 37.9),
    ("Kiribati", "KIR", 1.9, -157.4),
    ("Kosovo", "XKX", 42.6, 20.9),
    ("Kuwait", "KWT", 29.3, 47.5),
    ("Kyrgyzstan", "KGZ", 41.2, 74.8),
    ("Laos", "LAO", 19.9, 102.5),
    ("Latvia", "LVA", 56.9, 24.6),
    ("Lebanon", "LBN", 33.9, 35.9),
    ("Lesotho", "LSO", -29.6, 28.2),
    ("Liberia", "LBR", 6.4, -9.4),
    ("Libya", "LBY", 26.3, 17.2),
    ("Liechtenstein", "LIE", 47.2, 9.6),
    ("Lithuania", "LTU", 55.2, 23.9),
    ("Luxembourg", "LUX", 49.8, 6.1),
    ("Macao", "MAC", 22.2, 113.5),
    ("Madagascar", "MDG", -18.8, 46.9),
    ("Malawi", "MWI", -13.3, 34.3),
    ("Malaysia", "MYS", 4.2, 102.0),
    ("Maldives", "MDV", 3.2, 73.2),
    ("Mali", "MLI", 17.6, -4.0),
    ("Malta", "MLT", 35.9, 14.4),
    ("Marshall Islands", "MHL", 7.1, 171.2),
    ("Martinique", "MTQ", 14.6, -61.0),
    ("Mauritania", "MRT", 21.0, -10.9),
    ("Mauritius", "MUS", -20.3, 57.6),
    ("Mayotte", "MYT", -12.8, 45.2),
    ("Mexico", "MEX", 23.6, -102.6),
    ("Micronesia", "FSM", 7.4, 150.6),
    ("Moldova", "MDA", 47.4, 28.4),
    ("Monaco", "MCO", 43.7, 7.4),
    ("Mongolia", "MNG", 46.9, 103.8),
    ("Montenegro", "MNE", 42.7, 19.4),
    ("Montserrat", "MSR", 16.7, -62.2),
    ("Morocco", "MAR", 31.8, -7.1),
    ("Mozambique", "MOZ", -18.7, 35.5),
    ("Myanmar", "MMR", 21.9, 95.96),
    ("Namibia", "NAM", -22.96, 18.5),
    ("Nauru", "NRU", -0.5, 166.9),
    ("Nepal", "NPL", 28.4, 84.1),
    ("Netherlands", "NLD", 52.1, 5.3),
    ("New Caledonia", "NCL", -20.9, 165.6),
    ("New Zealand", "NZL", -40.9, 174.9),
    ("Nicaragua", "NIC", 12.9, -85.2),
    ("Niger", "NER", 17.6, 8.1),
    ("Nigeria", "NGA", 9.1, 8.7),
    ("Niue", "NIU", -19.1, -169.9),
    ("North Korea", "PRK", 40.3, 127.5),
    ("North Macedonia", "MKD", 41.6, 21.7),
    ("Northern Mariana Islands", "MNP", 17.3, 145.4),
    ("Norway", "NOR", 60.5, 8.5),
    ("Oman", "OMN", 21.5, 55.9),
    ("Pakistan", "PAK", 30.4, 69.3),
    ("Palau", "PLW", 7.5, 134.6),
    ("Palestine", "PSE", 31.9, 35.2),
    ("Panama", "PAN", 8.5, -80.8),
    ("Papua New Guinea", "PNG", -6.3, 143.96),
    ("Paraguay", "PRY", -23.4, -58.4),
    ("Peru", "PER", -9.2, -75.0),
    ("Philippines", "PHL", 12.9, 121.8),
    ("Poland", "POL", 51.9, 19.1),
    ("Portugal", "PRT", 39.4, -8.2),
    ("Puerto Rico", "PRI", 18.2, -66.6),
    ("Qatar", "QAT", 25.4, 51.2),
    ("Reunion", "REU", -21.1, 55.5),
    ("Romania", "ROU", 45.9, 25.0),
    ("Russia", "RUS", 61.5, 105.3),
    ("Rwanda", "RWA", -1.9, 29.9),
    ("Saint Kitts and Nevis", "KNA", 17.4, -62.8),
    ("Saint Lucia", "LCA", 13.9, -61.0),
    ("Saint Vincent and the Grenadines", "VCT", 12.98, -61.3),
    ("Samoa", "WSM", -13.8, -172.1),
    ("San Marino", "SMR", 43.9, 12.5),
    ("Sao Tome and Principe", "STP", 0.2, 6.6),
    ("Saudi Arabia", "SAU", 23.9, 45.1),
    ("Senegal", "SEN", 14.5, -14.5),
    ("Serbia", "SRB", 44.0, 21.0),
    ("Seychelles", "SYC", -4.7, 55.5),
    ("Sierra Leone", "SLE", 8.5, -11.8),
    ("Singapore", "SGP", 1.35, 103.8),
    ("Slovakia", "SVK", 48.7, 19.7),
    ("Slovenia", "SVN", 46.2, 14.99),
    ("Solomon Islands", "SLB", -9.6, 160.2),
    ("Somalia", "SOM", 5.2, 46.2),
    ("South Africa", "ZAF", -30.6, 22.9),
    ("South Korea", "KOR", 35.9, 127.8),
    ("South Sudan", "SSD", 6.9, 31.3),
    ("Spain", "ESP", 40.5, -3.7),
    ("Sri Lanka", "LKA", 7.9, 80.8),
    ("Sudan", "SDN", 12.9, 30.2),
    ("Suriname", "SUR", 3.9, -56.0),
    ("Sweden", "SWE", 60.1, 18.6),
    ("Switzerland", "CHE", 46.8, 8.2),
    ("Syria", "SYR", 34.8, 39.0),
    ("Taiwan", "TWN", 23.7, 121.0),
    ("Tajikistan", "TJK", 38.9, 71.3),
    ("Tanzania", "TZA", -6.4, 34.9),
    ("Thailand", "THA", 15.9, 100.99),
    ("Timor", "TLS", -8.9, 125.7),
    ("Togo", "TGO", 8.6, 0.8),
    ("Tokelau", "TKL", -9.0, -171.9),
    ("Tonga", "TON", -21.2, -175.2),
    ("Trinidad and Tobago", "TTO", 10.7, -61.2),
    ("Tunisia", "TUN", 33.9, 9.5),
    ("Turkey", "TUR", 38.96, 35.2),
    ("Turkmenistan", "TKM", 38.97, 59.6),
    ("Turks and Caicos Islands", "TCA", 21.7, -71.8),
    ("Tuvalu", "TUV", -7.1, 177.6),
    ("Uganda", "UGA", 1.4, 32.3),
    ("Ukraine", "UKR", 48.4, 31.2),
    ("United Arab Emirates", "ARE", 23.4, 53.8),
    ("United Kingdom", "GBR", 55.4, -3.4),
    ("United States", "USA", 37.1, -95.7),
    ("United States Virgin Islands", "VIR", 18.3, -64.9),
    ("Uruguay", "URY", -32.5, -55.8),
    ("Uzbekistan", "UZB", 41.4, 64.6),
    ("Vanuatu", "VUT", -15.4, 166.96),
    ("Vatican", "VAT", 41.9, 12.5),
    ("Venezuela", "VEN", 6.4, -66.6),
    ("Vietnam", "VNM", 14.1, 108.3),
    ("Western Sahara", "ESH", 24.2, -12.9),
    ("Yemen", "YEM", 15.6, 48.5),
    ("Zambia", "ZMB", -13.1, 27.8),
    ("Zimbabwe", "ZWE", -19.0, 29.2),
];

/// Alternative spellings mapped to the names in [`COUNTRIES`].
const ALIASES: &[(&str, &str)] = &[
    ("Bahamas, The", "Bahamas"),
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Brunei Darussalam", "Brunei"),
    ("Burma", "Myanmar"),
    ("Cabo Verde", "Cape Verde"),
    ("Congo (Brazzaville)", "Congo"),
    ("Congo (Kinshasa)", "Democratic Republic of Congo"),
    ("Congo, Dem. Rep.", "Democratic Republic of Congo"),
    ("Congo, Democratic Republic of the", "Democratic Republic of Congo"),
    ("Congo, Rep.", "Congo"),
    ("Curaçao", "Curacao"),
    ("Czechia", "Czech Republic"),
    ("Côte d'Ivoire", "Cote d'Ivoire"),
    ("Democratic Republic of the Congo", "Democratic Republic of Congo"),
    ("DR Congo", "Democratic Republic of Congo"),
    ("East Timor", "Timor"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Faeroe Islands", "Faroe Islands"),
    ("Falkland Islands (Malvinas)", "Falkland Islands"),
    ("Federated States of Micronesia", "Micronesia"),
    ("Gambia, The", "Gambia"),
    ("Holy See", "Vatican"),
    ("Hong Kong SAR, China", "Hong Kong"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Ivory Coast", "Cote d'Ivoire"),
    ("Korea, Dem. People's Rep.", "North Korea"),
    ("Korea, Democratic People's Republic of", "North Korea"),
    ("Korea, Rep.", "South Korea"),
    ("Korea, Republic of", "South Korea"),
    ("Kyrgyz Republic", "Kyrgyzstan"),
    ("Lao PDR", "Laos"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Macao SAR, China", "Macao"),
    ("Macau", "Macao"),
    ("Macedonia", "North Macedonia"),
    ("Micronesia (country)", "Micronesia"),
    ("Micronesia, Fed. Sts.", "Micronesia"),
    ("Republic of Congo", "Congo"),
    ("Republic of Korea", "South Korea"),
    ("Republic of Moldova", "Moldova"),
    ("Republic of the Congo", "Congo"),
    ("Russian Federation", "Russia"),
    ("Réunion", "Reunion"),
    ("Slovak Republic", "Slovakia"),
    ("St. Kitts and Nevis", "Saint Kitts and Nevis"),
    ("St. Lucia", "Saint Lucia"),
    ("St. Vincent and the Grenadines", "Saint Vincent and the Grenadines"),
    ("State of Palestine", "Palestine"),
    ("Swaziland", "Eswatini"),
    ("Syrian Arab Republic", "Syria"),
    ("São Tomé and Príncipe", "Sao Tome and Principe"),
    ("The Bahamas", "Bahamas"),
    ("The Gambia", "Gambia"),
    ("Timor-Leste", "Timor"),
    ("Turkiye", "Turkey"),
    ("Türkiye", "Turkey"),
    ("UK", "United Kingdom"),
    ("United Kingdom of Great Britain and Northern Ireland", "United Kingdom"),
    ("United Republic of Tanzania", "Tanzania"),
    ("United States of America", "United States"),
    ("USA", "United States"),
    ("Vatican City", "Vatican"),
    ("Venezuela (Bolivarian Republic of)", "Venezuela"),
    ("Venezuela, RB", "Venezuela"),
    ("Viet Nam", "Vietnam"),
    ("Virgin Islands (U.S.)", "United States Virgin Islands"),
    ("Virgin Islands, U.S.", "United States Virgin Islands"),
    ("West Bank and Gaza", "Palestine"),
    ("Yemen, Rep.", "Yemen"),
];

/// A country located on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryLocation {
    pub iso3: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// One shaded region of the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRegion {
    pub country: String,
    pub location: CountryLocation,
    pub value: f64,
    pub color: [u8; 3],
}

/// Shaded regions with the value range used for the colour scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLayer {
    pub regions: Vec<MapRegion>,
    pub min: f64,
    pub max: f64,
}

impl MapLayer {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Look up a country by name (case-insensitive, aliases included).
pub fn locate_country(name: &str) -> Option<CountryLocation> {
    let name = name.trim();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, target)| *target)
        .unwrap_or(name);

    COUNTRIES
        .iter()
        .find(|(n, _, _, _)| n.eq_ignore_ascii_case(canonical))
        .map(|&(_, iso3, lat, lon)| CountryLocation { iso3, lat, lon })
}

/// Colour for `t` in [0, 1] on the Reds scale, linearly interpolated.
pub fn reds(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (REDS.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(REDS.len() - 1);
    let frac = scaled - lower as f64;

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let a = REDS[lower][i] as f64;
        let b = REDS[upper][i] as f64;
        *channel = (a + (b - a) * frac).round() as u8;
    }
    rgb
}

/// Build the map layer from per-country means.
///
/// Fails when any country cannot be placed; the caller drops the map and
/// keeps the rest of the dashboard.
pub fn build_map_layer(means: &BTreeMap<String, f64>) -> Result<MapLayer, MapError> {
    let mut unknown = Vec::new();
    let mut located = Vec::with_capacity(means.len());

    for (country, &value) in means {
        match locate_country(country) {
            Some(location) => located.push((country.clone(), location, value)),
            None => unknown.push(country.clone()),
        }
    }

    if !unknown.is_empty() {
        warn!("Map omitted, unrecognized countries: {}", unknown.join(", "));
        return Err(MapError::UnknownCountries(unknown));
    }

    if located.is_empty() {
        return Ok(MapLayer::default());
    }

    let min = located.iter().map(|(_, _, v)| *v).fold(f64::INFINITY, f64::min);
    let max = located
        .iter()
        .map(|(_, _, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let regions = located
        .into_iter()
        .map(|(country, location, value)| {
            let t = if span > 0.0 { (value - min) / span } else { 1.0 };
            MapRegion {
                country,
                location,
                value,
                color: reds(t),
            }
        })
        .collect();

    Ok(MapLayer { regions, min, max })
}
