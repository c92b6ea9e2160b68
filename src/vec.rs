use std::ops::{
    Add, AddAssign, Deref, DerefMut, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub,
    SubAssign,
};

pub type Mat4x4 = Mat<f32, 4, 4>;

/// Row-major `M x N` matrix. Vectors are row vectors (`Mat<T, 1, N>`), so points are
/// transformed as `v * m` and the translation of a 4x4 transform lives in row 3.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat<T, const M: usize, const N: usize>([[T; N]; M]);

impl<T: Num, const M: usize, const N: usize> Mat<T, M, N> {
    pub fn new(rows: [[T; N]; M]) -> Self {
        Mat(rows)
    }

    pub fn zero() -> Self {
        Mat([[T::zero(); N]; M])
    }

    pub fn one() -> Self {
        Mat([[T::one(); N]; M])
    }

    pub fn transpose(self) -> Mat<T, N, M> {
        let mut ret = Mat::zero();
        for i in 0..M {
            for j in 0..N {
                ret[(j, i)] = self[(i, j)];
            }
        }
        ret
    }

    pub fn map(self, mut f: impl FnMut(T) -> T) -> Self {
        Mat(self.0.map(|row| row.map(&mut f)))
    }
}

impl<T: Num, const N: usize> Mat<T, N, N> {
    pub fn identity() -> Self {
        let mut ret = Self::zero();
        for i in 0..N {
            ret[(i, i)] = T::one();
        }
        ret
    }
}

impl<T: Num> Mat<T, 4, 4> {
    #[rustfmt::skip]
    pub fn rotation_x(theta: T) -> Self {
        let o = T::one();
        let z = T::zero();
        let cos = theta.cos();
        let sin = theta.sin();
        Mat([[   o,   z,   z,   z],
             [   z, cos,-sin,   z],
             [   z, sin, cos,   z],
             [   z,   z,   z,   o]])
    }

    #[rustfmt::skip]
    pub fn rotation_y(theta: T) -> Self {
        let o = T::one();
        let z = T::zero();
        let cos = theta.cos();
        let sin = theta.sin();
        Mat([[ cos,   z, sin,   z],
             [   z,   o,   z,   z],
             [-sin,   z, cos,   z],
             [   z,   z,   z,   o]])
    }

    #[rustfmt::skip]
    pub fn rotation_z(theta: T) -> Self {
        let o = T::one();
        let z = T::zero();
        let cos = theta.cos();
        let sin = theta.sin();
        Mat([[ cos, -sin,   z,   z],
             [ sin,  cos,   z,   z],
             [   z,    z,   o,   z],
             [   z,    z,   z,   o]])
    }

    pub fn translation(&self) -> Vec<T, 3> {
        Vec::from([self[(3, 0)], self[(3, 1)], self[(3, 2)]])
    }

    pub fn set_translation(&mut self, translation: Vec<T, 3>) {
        self[(3, 0)] = translation.x;
        self[(3, 1)] = translation.y;
        self[(3, 2)] = translation.z;
    }

    /// Inverse of a matrix made only of a rotation followed by a translation. The 3x3 block
    /// is transposed and the translation is rotated back and negated. Any scale or shear in
    /// `self` produces a wrong result.
    pub fn orthogonal_inverse(&self) -> Self {
        let mut ret = Self::identity();
        for i in 0..3 {
            for j in 0..3 {
                ret[(i, j)] = self[(j, i)];
            }
        }
        ret[(3, 3)] = self[(3, 3)];

        let position = self.translation().to_hom() * ret;
        ret.set_translation(-position.xyz());
        ret
    }
}

impl Mat4x4 {
    /// Transform for normals: the inverse transpose of the upper 3x3 block, up to a positive
    /// factor. Results need normalizing. Singular matrices give a zero matrix.
    pub fn normal_matrix(&self) -> Mat<f32, 3, 3> {
        let row = |i: usize| Vec3::from([self[(i, 0)], self[(i, 1)], self[(i, 2)]]);
        let (r0, r1, r2) = (row(0), row(1), row(2));
        let cofactors = [r1.cross(r2), r2.cross(r0), r0.cross(r1)];
        let sign = if r0.dot(cofactors[0]) < 0. { -1. } else { 1. };
        Mat(cofactors.map(|r| (r * sign).to_array()))
    }
}

impl<T: Copy, const N: usize> From<[T; N]> for Vec<T, N> {
    fn from(value: [T; N]) -> Self {
        Mat([value])
    }
}

pub type Vec<T, const N: usize> = Mat<T, 1, N>;
pub type Vec2 = Vec<f32, 2>;
pub type Vec3 = Vec<f32, 3>;
pub type Vec4 = Vec<f32, 4>;

impl<T: Num, const N: usize> Vec<T, N> {
    pub fn repeat(value: T) -> Self {
        Mat([[value; N]])
    }

    pub fn to_array(self) -> [T; N] {
        self.0[0]
    }

    pub fn dot(self, rhs: Self) -> T {
        let mut ret = T::zero();
        for i in 0..N {
            ret += self[(0, i)] * rhs[(0, i)];
        }
        ret
    }

    pub fn mag_sq(&self) -> T {
        self.dot(*self)
    }

    pub fn mag(&self) -> T {
        self.mag_sq().sqrt()
    }

    /// Unit vector in the direction of `self`. A zero vector is returned unchanged.
    pub fn normalized(self) -> Self {
        let mag = self.mag();
        if mag == T::zero() {
            self
        } else {
            self / mag
        }
    }
}

impl<T: Num> Vec<T, 3> {
    pub fn cross(self, rhs: Self) -> Self {
        Self::from([
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        ])
    }

    /// Homogeneous point (`w = 1`).
    pub fn to_hom(self) -> Vec<T, 4> {
        Vec::from([self.x, self.y, self.z, T::one()])
    }

    /// Homogeneous direction (`w = 0`), unaffected by translation.
    pub fn to_dir(self) -> Vec<T, 4> {
        Vec::from([self.x, self.y, self.z, T::zero()])
    }

    pub fn to_translation(self) -> Mat<T, 4, 4> {
        let mut ret = Mat::identity();
        ret.set_translation(self);
        ret
    }

    pub fn to_scale(self) -> Mat<T, 4, 4> {
        let mut ret = Mat::zero();
        ret[(0, 0)] = self.x;
        ret[(1, 1)] = self.y;
        ret[(2, 2)] = self.z;
        ret[(3, 3)] = T::one();
        ret
    }

    /// Rotation from Euler angles in radians, applied about x, then y, then z.
    pub fn to_rotation(self) -> Mat<T, 4, 4> {
        Mat::rotation_x(self.x) * Mat::rotation_y(self.y) * Mat::rotation_z(self.z)
    }
}

impl<T, const M: usize, const N: usize> Index<(usize, usize)> for Mat<T, M, N> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.0[i][j]
    }
}

impl<T, const M: usize, const N: usize> IndexMut<(usize, usize)> for Mat<T, M, N> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.0[i][j]
    }
}

impl<T: Num, const M: usize, const N: usize> Add for Mat<T, M, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut ret = self;
        ret += rhs;
        ret
    }
}

impl<T: Num, const M: usize, const N: usize> AddAssign for Mat<T, M, N> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..M {
            for j in 0..N {
                self[(i, j)] += rhs[(i, j)];
            }
        }
    }
}

impl<T: Num, const M: usize, const N: usize> Sub for Mat<T, M, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut ret = self;
        ret -= rhs;
        ret
    }
}

impl<T: Num, const M: usize, const N: usize> SubAssign for Mat<T, M, N> {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..M {
            for j in 0..N {
                self[(i, j)] -= rhs[(i, j)];
            }
        }
    }
}

impl<T: Num, const M: usize, const N: usize> Neg for Mat<T, M, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|el| -el)
    }
}

impl<T: Num, const M: usize, const N: usize> Mul<T> for Mat<T, M, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|el| el * rhs)
    }
}

impl<T: Num, const M: usize, const N: usize> MulAssign<T> for Mat<T, M, N> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

macro_rules! impl_mul_lhs {
    ($($ty:ty),+) => {
        $(impl<const M: usize, const N: usize> Mul<Mat<$ty, M, N>> for $ty {
            type Output = Mat<$ty, M, N>;

            fn mul(self, rhs: Mat<$ty, M, N>) -> Mat<$ty, M, N> {
                rhs * self
            }
        })+
    };
}

impl_mul_lhs!(f32);

impl<T: Num, const M: usize, const K: usize, const N: usize> Mul<Mat<T, K, N>> for Mat<T, M, K> {
    type Output = Mat<T, M, N>;

    fn mul(self, rhs: Mat<T, K, N>) -> Self::Output {
        let mut ret = Mat::zero();
        for i in 0..M {
            for j in 0..N {
                for k in 0..K {
                    ret[(i, j)] += self[(i, k)] * rhs[(k, j)];
                }
            }
        }
        ret
    }
}

impl<T: Num, const M: usize, const N: usize> Div<T> for Mat<T, M, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|el| el / rhs)
    }
}

impl<T: Num, const M: usize, const N: usize> DivAssign<T> for Mat<T, M, N> {
    fn div_assign(&mut self, rhs: T) {
        *self = *self / rhs;
    }
}

// SAFETY (all `Deref` impls below): `Mat<T, 1, N>` is `repr(transparent)` over `[[T; N]; 1]`,
// which has the same layout as a `repr(C)` struct of `N` fields of type `T`.

impl<T: Num> Deref for Vec<T, 2> {
    type Target = XY<T>;

    fn deref(&self) -> &XY<T> {
        unsafe { &*(self as *const Self as *const XY<T>) }
    }
}

impl<T: Num> DerefMut for Vec<T, 2> {
    fn deref_mut(&mut self) -> &mut XY<T> {
        unsafe { &mut *(self as *mut Self as *mut XY<T>) }
    }
}

impl<T: Num> Deref for Vec<T, 3> {
    type Target = XYZ<T>;

    fn deref(&self) -> &XYZ<T> {
        unsafe { &*(self as *const Self as *const XYZ<T>) }
    }
}

impl<T: Num> DerefMut for Vec<T, 3> {
    fn deref_mut(&mut self) -> &mut XYZ<T> {
        unsafe { &mut *(self as *mut Self as *mut XYZ<T>) }
    }
}

impl<T: Num> Deref for Vec<T, 4> {
    type Target = XYZW<T>;

    fn deref(&self) -> &XYZW<T> {
        unsafe { &*(self as *const Self as *const XYZW<T>) }
    }
}

impl<T: Num> DerefMut for Vec<T, 4> {
    fn deref_mut(&mut self) -> &mut XYZW<T> {
        unsafe { &mut *(self as *mut Self as *mut XYZW<T>) }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct XY<T> {
    pub x: T,
    pub y: T,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct XYZ<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> XYZ<T> {
    pub fn xy(&self) -> Vec<T, 2> {
        Vec::from([self.x, self.y])
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct XYZW<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

impl<T: Copy> XYZW<T> {
    pub fn xy(&self) -> Vec<T, 2> {
        Vec::from([self.x, self.y])
    }

    pub fn xyz(&self) -> Vec<T, 3> {
        Vec::from([self.x, self.y, self.z])
    }
}

pub trait Num:
    Copy
    + PartialEq
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Mul<Output = Self>
    + MulAssign
    + Div<Output = Self>
    + DivAssign
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
}

impl Num for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    fn sin(self) -> Self {
        f32::sin(self)
    }

    fn cos(self) -> Self {
        f32::cos(self)
    }
}
