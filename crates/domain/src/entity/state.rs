//! Enumerated states reported by the platform.
//!
//! Each enum publishes its platform literal (`OPEN`, `TILTED`, …) so bus
//! consumers see the same values the platform uses.

use serde::{Deserialize, Serialize};

macro_rules! platform_enum {
    ($(#[doc = $doc:expr])* $name:ident { $($variant:ident => $literal:literal),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $literal)]
                $variant,
            )+
        }

        impl $name {
            /// The platform literal for this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $literal,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for crate::entity::AttributeValue {
            fn from(value: $name) -> Self {
                Self::String(value.as_str().to_string())
            }
        }
    };
}

platform_enum!(
    /// Opening state of a window or door contact.
    WindowState {
        Open => "OPEN",
        Closed => "CLOSED",
        Tilted => "TILTED",
    }
);

platform_enum!(
    /// Position of a garage or gate door.
    DoorState {
        Closed => "CLOSED",
        Open => "OPEN",
        VentilationPosition => "VENTILATION_POSITION",
        PositionUnknown => "POSITION_UNKNOWN",
    }
);

platform_enum!(
    /// Control mode of a heating group.
    ClimateControlMode {
        Automatic => "AUTOMATIC",
        Manual => "MANUAL",
        Eco => "ECO",
    }
);

platform_enum!(
    /// Aggregation the weather sensor applies to its wind reading.
    WindValueType {
        CurrentValue => "CURRENT_VALUE",
        MinValue => "MIN_VALUE",
        MaxValue => "MAX_VALUE",
        AverageValue => "AVERAGE_VALUE",
    }
);

platform_enum!(
    /// Hardware models reporting a window state.
    WindowSensorModel {
        ShutterContact => "SHUTTER_CONTACT",
        ShutterContactMagnetic => "SHUTTER_CONTACT_MAGNETIC",
        ContactInterface => "CONTACT_INTERFACE",
        RotaryHandleSensor => "ROTARY_HANDLE_SENSOR",
    }
);
