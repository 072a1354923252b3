use chrono::FixedOffset;
use teloxide::utils::html;

use common::{Action, Alert};

/// Render an alert as a Telegram HTML message.
pub fn format_alert(alert: &Alert, chart_url: &str, exchange: &str) -> String {
    let marker = match alert.action {
        Action::Buy => "🟢",
        Action::Sell => "🔴",
    };
    let action = alert.action.to_string().to_uppercase();
    let zone = zone_label(*alert.local_time.offset());

    format!(
        "{marker} <b>TrendPulse Alert</b> {marker}\n\
         {pair}: <b>{action}</b>\n\
         📊 WT1: {wt1:.2} | WT2: {wt2:.2}\n\
         💰 Cap: ${cap}\n\
         📈 Vol24h: ${vol}\n\
         🕐 {time} {zone}\n\
         📅 {day}\n\
         ⏰ {timeframe}\n\
         \n\
         🔗 <a href=\"{url}\">{exchange} {pair} chart</a>",
        pair = html::escape(&alert.pair),
        wt1 = alert.wave1,
        wt2 = alert.wave2,
        cap = thousands(alert.asset.market_cap),
        vol = thousands(alert.asset.volume_24h),
        time = alert.local_time.format("%I:%M %p %d-%m-%Y"),
        day = alert.local_time.format("%A, %d %B %Y"),
        timeframe = timeframe_label(&alert.interval),
        url = html::escape(chart_url),
        exchange = html::escape(exchange),
    )
}

/// Whole-number rendering with comma thousands separators: `1234567.8` -> `1,234,568`.
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value.is_sign_negative() && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

/// `15m` -> `15-minute timeframe`. Unknown notations are shown as given.
pub fn timeframe_label(interval: &str) -> String {
    let split = interval.find(|c: char| !c.is_ascii_digit()).unwrap_or(interval.len());
    let (count, unit) = interval.split_at(split);
    let unit = match unit {
        "m" => "minute",
        "h" => "hour",
        "d" => "day",
        "w" => "week",
        "M" => "month",
        _ => return format!("{interval} timeframe"),
    };
    if count.is_empty() {
        return format!("{interval} timeframe");
    }
    format!("{count}-{unit} timeframe")
}

fn zone_label(offset: FixedOffset) -> String {
    match offset.local_minus_utc() {
        0 => "UTC".to_string(),
        19_800 => "IST".to_string(),
        _ => format!("UTC{offset}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::Asset;

    fn alert(action: Action, offset_minutes: i32) -> Alert {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        Alert {
            asset: Asset {
                id: "bitcoin".into(),
                symbol: "BTC".into(),
                name: "Bitcoin".into(),
                market_cap: 1_234_567_890_123.0,
                volume_24h: 30_500_000.4,
            },
            pair: "BTCUSDT".into(),
            action,
            wave1: -64.456,
            wave2: -66.1,
            interval: "15m".into(),
            local_time: offset.with_ymd_and_hms(2024, 5, 1, 15, 37, 0).unwrap(),
            bucket: "03:37 PM 01-05-2024".into(),
        }
    }

    const URL: &str = "https://www.tradingview.com/chart/?symbol=BYBIT%3ABTCUSDT";

    #[test]
    fn buy_message_layout() {
        let text = format_alert(&alert(Action::Buy, 330), URL, "BYBIT");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "🟢 <b>TrendPulse Alert</b> 🟢");
        assert_eq!(lines[1], "BTCUSDT: <b>BUY</b>");
        assert_eq!(lines[2], "📊 WT1: -64.46 | WT2: -66.10");
        assert_eq!(lines[3], "💰 Cap: $1,234,567,890,123");
        assert_eq!(lines[4], "📈 Vol24h: $30,500,000");
        assert_eq!(lines[5], "🕐 03:37 PM 01-05-2024 IST");
        assert_eq!(lines[6], "📅 Wednesday, 01 May 2024");
        assert_eq!(lines[7], "⏰ 15-minute timeframe");
        assert_eq!(lines[8], "");
        assert_eq!(
            lines[9],
            "🔗 <a href=\"https://www.tradingview.com/chart/?symbol=BYBIT%3ABTCUSDT\">BYBIT BTCUSDT chart</a>"
        );
    }

    #[test]
    fn sell_message_uses_red_marker() {
        let text = format_alert(&alert(Action::Sell, 0), URL, "BYBIT");
        assert!(text.starts_with("🔴 <b>TrendPulse Alert</b> 🔴"));
        assert!(text.contains("<b>SELL</b>"));
        assert!(text.contains("PM 01-05-2024 UTC\n"));
    }

    #[test]
    fn other_offsets_are_spelled_out() {
        let text = format_alert(&alert(Action::Buy, 120), URL, "BYBIT");
        assert!(text.contains("01-05-2024 UTC+02:00\n"));
    }

    #[test]
    fn escapes_html_in_pair() {
        let mut a = alert(Action::Buy, 330);
        a.pair = "A<B>&USDT".into();
        let text = format_alert(&a, URL, "BYBIT");
        assert!(text.contains("A&lt;B&gt;&amp;USDT: <b>BUY</b>"));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1_000.0), "1,000");
        assert_eq!(thousands(50_000_000.0), "50,000,000");
        assert_eq!(thousands(1_234_567.8), "1,234,568");
        assert_eq!(thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn timeframe_labels() {
        assert_eq!(timeframe_label("15m"), "15-minute timeframe");
        assert_eq!(timeframe_label("1h"), "1-hour timeframe");
        assert_eq!(timeframe_label("1d"), "1-day timeframe");
        assert_eq!(timeframe_label("1M"), "1-month timeframe");
        assert_eq!(timeframe_label("h"), "h timeframe");
        assert_eq!(timeframe_label("15x"), "15x timeframe");
    }
}
