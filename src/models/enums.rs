use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Declares a closed set of snake_case string tags backing a single field.
///
/// Decoding goes through `FromStr`, so an unknown tag in a JSON payload is
/// reported against the backing field rather than as a syntax error.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident for $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $tag)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const TAGS: &'static [&'static str] = &[$($tag),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($tag => Ok($name::$variant),)+
                    _ => Err(ValidationError::one_of($field, Self::TAGS)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.parse().map_err(validation::rejected_tag)
            }
        }
    };
}

closed_enum! {
    #[derive(Default)]
    OrderStatus for "status" {
        #[default]
        Pending => "pending",
        Confirmed => "confirmed",
        InTransit => "in_transit",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

closed_enum! {
    #[derive(Default)]
    DeliveryStatus for "status" {
        #[default]
        Assigned => "assigned",
        InTransit => "in_transit",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

closed_enum! {
    #[derive(Default)]
    PaymentStatus for "payment_status" {
        #[default]
        Pending => "pending",
        Successful => "successful",
        Failed => "failed",
    }
}

closed_enum! {
    PaymentMethod for "payment_method" {
        CreditCard => "credit_card",
        PayPal => "paypal",
        Crypto => "crypto",
        BankTransfer => "bank_transfer",
    }
}

closed_enum! {
    VehicleType for "type" {
        Bike => "bike",
        Car => "car",
        Truck => "truck",
        Airplane => "airplane",
        Ship => "ship",
    }
}
