use crate::domain::quote::Quote;

/// Fixed quotation template sent back to the customer. Locale-fixed by
/// design; there is no internationalization layer.
pub fn format_quotation(foreign_amount: u32, local_amount: u64) -> String {
    format!(
        "【報價單】\n\
         商品價格：{foreign_amount} RMB\n\
         換算台幣價格：NT$ {local_amount}\n\
         沒問題的話跟我說一聲～\n\
         傳給您付款資訊"
    )
}

pub fn format_quote(quote: &Quote) -> String {
    format_quotation(quote.foreign_amount, quote.local_amount)
}

/// One-line usage reply for messages that are not quote commands.
pub fn usage_hint() -> &'static str {
    "輸入：報價 1680（可加 VIP1/VIP2/VIP3、用券）"
}
