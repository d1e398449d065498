//! Command catalogue and payload types.
//!
//! Every command serializes to the exact wire envelope
//! `{"command": "<NAME>", "payload": {...}}`.
//!
//! | Command | Payload |
//! |---------|---------|
//! | `PING` | `{}` |
//! | `TAKE_SCREENSHOT` | [`ScreenshotParams`] |
//! | `GET_DOM` | `{window_label}` |
//! | `EXECUTE_JS` | [`ExecuteJsParams`] |
//! | `SIMULATE_MOUSE_MOVEMENT` | [`MouseMoveParams`] |
//! | `SIMULATE_TEXT_INPUT` | [`TypeTextParams`] |
//! | `GET_ELEMENT_POSITION` | [`ElementPositionParams`] |
//! | `SEND_TEXT_TO_ELEMENT` | [`SendTextParams`] |
//! | `MANAGE_LOCAL_STORAGE` | [`LocalStorageParams`] |
//! | `MANAGE_WINDOW` | [`WindowParams`] |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::WindowLabel;

// ============================================================================
// Command
// ============================================================================

/// All commands understood by the GUI peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Liveness probe.
    Ping {},

    /// Capture a window screenshot.
    TakeScreenshot(ScreenshotParams),

    /// Serialize the DOM of a window.
    GetDom {
        /// Target window.
        window_label: WindowLabel,
    },

    /// Run JavaScript in a window.
    ExecuteJs(ExecuteJsParams),

    /// Move the pointer, optionally clicking.
    SimulateMouseMovement(MouseMoveParams),

    /// Type text into whatever has focus.
    SimulateTextInput(TypeTextParams),

    /// Resolve an element's bounding box.
    GetElementPosition(ElementPositionParams),

    /// Type text into a specific element.
    SendTextToElement(SendTextParams),

    /// Read or write `localStorage`.
    ManageLocalStorage(LocalStorageParams),

    /// Move, resize, focus or otherwise control a window.
    ManageWindow(WindowParams),
}

impl Command {
    /// Returns the wire name of the command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping {} => "PING",
            Self::TakeScreenshot(_) => "TAKE_SCREENSHOT",
            Self::GetDom { .. } => "GET_DOM",
            Self::ExecuteJs(_) => "EXECUTE_JS",
            Self::SimulateMouseMovement(_) => "SIMULATE_MOUSE_MOVEMENT",
            Self::SimulateTextInput(_) => "SIMULATE_TEXT_INPUT",
            Self::GetElementPosition(_) => "GET_ELEMENT_POSITION",
            Self::SendTextToElement(_) => "SEND_TEXT_TO_ELEMENT",
            Self::ManageLocalStorage(_) => "MANAGE_LOCAL_STORAGE",
            Self::ManageWindow(_) => "MANAGE_WINDOW",
        }
    }
}

// ============================================================================
// Screenshot
// ============================================================================

/// Parameters for `TAKE_SCREENSHOT`.
///
/// Optional fields are passed through verbatim and omitted when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotParams {
    /// Target window.
    pub window_label: WindowLabel,
    /// JPEG quality (0-100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    /// Maximum output width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    /// Maximum output size in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<f64>,
}

impl ScreenshotParams {
    /// Creates parameters for the main window.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = label.into();
        self
    }

    /// Sets JPEG quality, clamped to 100.
    #[inline]
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality.min(100));
        self
    }

    /// Sets the maximum width.
    #[inline]
    #[must_use]
    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Sets the maximum size in megabytes.
    #[inline]
    #[must_use]
    pub fn with_max_size_mb(mut self, max_size_mb: f64) -> Self {
        self.max_size_mb = Some(max_size_mb);
        self
    }
}

// ============================================================================
// Script
// ============================================================================

/// Parameters for `EXECUTE_JS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteJsParams {
    /// Script source.
    pub code: String,
    /// Target window.
    pub window_label: WindowLabel,
    /// Peer-side execution timeout, also used as the request timeout.
    ///
    /// Unset means the client's configured script timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ExecuteJsParams {
    /// Creates parameters for the main window.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            window_label: WindowLabel::main(),
            timeout_ms: None,
        }
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = label.into();
        self
    }

    /// Sets the timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

// ============================================================================
// Input
// ============================================================================

/// Mouse button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button.
    #[default]
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Parameters for `SIMULATE_MOUSE_MOVEMENT`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseMoveParams {
    /// Target x coordinate.
    pub x: f64,
    /// Target y coordinate.
    pub y: f64,
    /// Interpret `x`/`y` as an offset from the current position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<bool>,
    /// Click after moving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<bool>,
    /// Button used when clicking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
}

impl MouseMoveParams {
    /// Creates an absolute move to `(x, y)`.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Makes the move relative.
    #[inline]
    #[must_use]
    pub fn relative(mut self) -> Self {
        self.relative = Some(true);
        self
    }

    /// Clicks with `button` after moving.
    #[inline]
    #[must_use]
    pub fn with_click(mut self, button: MouseButton) -> Self {
        self.click = Some(true);
        self.button = Some(button);
        self
    }
}

/// Parameters for `SIMULATE_TEXT_INPUT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTextParams {
    /// Text to type.
    pub text: String,
    /// Delay between keystrokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl TypeTextParams {
    /// Creates parameters without keystroke delay.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay_ms: None,
        }
    }

    /// Sets the keystroke delay.
    #[inline]
    #[must_use]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

// ============================================================================
// Elements
// ============================================================================

/// How an element selector is interpreted by the peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    /// CSS selector.
    #[default]
    Css,
    /// Element `id`.
    Id,
    /// Class name.
    Class,
    /// Tag name.
    Tag,
    /// Visible text.
    Text,
    /// XPath expression.
    Xpath,
}

/// Parameters for `GET_ELEMENT_POSITION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPositionParams {
    /// Target window.
    pub window_label: WindowLabel,
    /// Selector kind.
    pub selector_type: SelectorType,
    /// Selector text.
    pub selector_value: String,
    /// Ask the peer to focus/click the element while resolving it.
    pub should_click: bool,
    /// Return viewport coordinates instead of screen coordinates.
    pub raw_coordinates: bool,
}

impl ElementPositionParams {
    /// Creates parameters for a CSS selector in the main window.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            window_label: WindowLabel::main(),
            selector_type: SelectorType::Css,
            selector_value: selector.into(),
            should_click: false,
            raw_coordinates: false,
        }
    }

    /// Sets the selector kind.
    #[inline]
    #[must_use]
    pub fn with_selector_type(mut self, selector_type: SelectorType) -> Self {
        self.selector_type = selector_type;
        self
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = label.into();
        self
    }

    /// Requests a pre-click focus on the peer side.
    #[inline]
    #[must_use]
    pub fn with_click(mut self) -> Self {
        self.should_click = true;
        self
    }

    /// Requests raw viewport coordinates.
    #[inline]
    #[must_use]
    pub fn with_raw_coordinates(mut self) -> Self {
        self.raw_coordinates = true;
        self
    }
}

/// Parameters for `SEND_TEXT_TO_ELEMENT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTextParams {
    /// Target window.
    pub window_label: WindowLabel,
    /// Selector kind.
    pub selector_type: SelectorType,
    /// Selector text.
    pub selector_value: String,
    /// Text to type.
    pub text: String,
    /// Delay between keystrokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl SendTextParams {
    /// Creates parameters for a CSS selector in the main window.
    #[must_use]
    pub fn css(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            window_label: WindowLabel::main(),
            selector_type: SelectorType::Css,
            selector_value: selector.into(),
            text: text.into(),
            delay_ms: None,
        }
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = label.into();
        self
    }

    /// Sets the selector kind.
    #[inline]
    #[must_use]
    pub fn with_selector_type(mut self, selector_type: SelectorType) -> Self {
        self.selector_type = selector_type;
        self
    }

    /// Sets the keystroke delay.
    #[inline]
    #[must_use]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

// ============================================================================
// Storage
// ============================================================================

/// `localStorage` operation performed by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageAction {
    /// Read one key.
    Get,
    /// Write one key.
    Set,
    /// Delete one key.
    Remove,
    /// Delete every key.
    Clear,
    /// List keys.
    Keys,
}

/// Parameters for `MANAGE_LOCAL_STORAGE`.
///
/// Field combinations are not validated here; the peer rejects invalid ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStorageParams {
    /// Operation.
    pub action: StorageAction,
    /// Key for `get`, `set` and `remove`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value for `set`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Target window; the peer picks its default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_label: Option<WindowLabel>,
}

impl LocalStorageParams {
    /// Creates parameters for `action` with no key or value.
    #[must_use]
    pub fn new(action: StorageAction) -> Self {
        Self {
            action,
            key: None,
            value: None,
            window_label: None,
        }
    }

    /// `get` for `key`.
    #[must_use]
    pub fn get(key: impl Into<String>) -> Self {
        Self::new(StorageAction::Get).with_key(key)
    }

    /// `set` of `key` to `value`.
    #[must_use]
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = Self::new(StorageAction::Set).with_key(key);
        params.value = Some(value.into());
        params
    }

    /// `remove` of `key`.
    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        Self::new(StorageAction::Remove).with_key(key)
    }

    /// Sets the key.
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = Some(label.into());
        self
    }
}

// ============================================================================
// Window
// ============================================================================

/// Window operation performed by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowOperation {
    /// Bring to front and focus.
    Focus,
    /// Minimize.
    Minimize,
    /// Maximize.
    Maximize,
    /// Restore from maximized.
    Unmaximize,
    /// Close.
    Close,
    /// Show a hidden window.
    Show,
    /// Hide.
    Hide,
    /// Move to `x`, `y`.
    SetPosition,
    /// Resize to `width`, `height`.
    SetSize,
    /// Center on screen.
    Center,
    /// Toggle fullscreen.
    ToggleFullscreen,
}

/// Parameters for `MANAGE_WINDOW`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowParams {
    /// Operation.
    pub operation: WindowOperation,
    /// Target window.
    pub window_label: WindowLabel,
    /// X position for `set_position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Y position for `set_position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// Width for `set_size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height for `set_size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl WindowParams {
    /// Creates parameters for the main window.
    #[must_use]
    pub fn new(operation: WindowOperation) -> Self {
        Self {
            operation,
            window_label: WindowLabel::main(),
            x: None,
            y: None,
            width: None,
            height: None,
        }
    }

    /// Sets the target window.
    #[inline]
    #[must_use]
    pub fn with_window(mut self, label: impl Into<WindowLabel>) -> Self {
        self.window_label = label.into();
        self
    }

    /// Sets the position.
    #[inline]
    #[must_use]
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Sets the size.
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
